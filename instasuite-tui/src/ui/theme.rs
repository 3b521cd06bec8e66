use ratatui::style::Color;

pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub background: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

/// Colors for the whole UI: the brand gradient's pink and purple on a dark
/// background
pub fn get_theme_colors() -> ThemeColors {
    ThemeColors {
        primary: Color::Rgb(225, 48, 108),   // brand pink
        secondary: Color::Rgb(131, 58, 180), // purple
        accent: Color::Rgb(252, 175, 69),    // orange
        text: Color::Rgb(230, 230, 230),
        text_dim: Color::Rgb(130, 130, 140),
        background: Color::Rgb(18, 18, 22),
        border: Color::Rgb(70, 60, 80),
        success: Color::Rgb(100, 220, 140),
        warning: Color::Rgb(255, 200, 100),
        error: Color::Rgb(255, 95, 95),
        highlight_bg: Color::Rgb(45, 30, 50),
    }
}
