use instasuite_types::MediaItem;

/// The media item currently shown full-screen, if any.
///
/// It shows the comments already attached to the item and never fetches
/// anything itself.
#[derive(Debug, Default, Clone)]
pub struct DetailOverlay {
    selected: Option<MediaItem>,
    /// Scroll offset within the overlay body
    pub scroll: u16,
}

impl DetailOverlay {
    pub fn open(&mut self, item: &MediaItem) {
        log::debug!(target: "general", "Opening detail for media {}", item.id);
        self.selected = Some(item.clone());
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&MediaItem> {
        self.selected.as_ref()
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let item: MediaItem = serde_json::from_str(
            r#"{"id":"m1","media_type":"VIDEO","media_url":"https://cdn/v.mp4","timestamp":"2024-01-01T00:00:00+0000"}"#,
        )
        .unwrap();

        let mut overlay = DetailOverlay::default();
        assert!(!overlay.is_open());

        overlay.open(&item);
        overlay.scroll_down();
        assert_eq!(overlay.selected().map(|i| i.id.as_str()), Some("m1"));
        assert_eq!(overlay.scroll, 1);

        overlay.close();
        assert!(overlay.selected().is_none());
        assert_eq!(overlay.scroll, 0);
    }
}
