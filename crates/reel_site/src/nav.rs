//! Section navigation
//!
//! Header links point at section anchors. Resolving one yields the scroll
//! offset that brings the section's top to the top of the viewport.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::SiteError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Home,
    About,
    Works,
    Feedback,
    Contact,
}

impl Anchor {
    /// Header order
    pub const ALL: [Anchor; 5] = [
        Anchor::Home,
        Anchor::About,
        Anchor::Works,
        Anchor::Feedback,
        Anchor::Contact,
    ];

    pub fn href(self) -> &'static str {
        match self {
            Anchor::Home => "#home",
            Anchor::About => "#about",
            Anchor::Works => "#works",
            Anchor::Feedback => "#feedback",
            Anchor::Contact => "#contact",
        }
    }

    /// Link text in the header
    pub fn label(self) -> &'static str {
        match self {
            Anchor::Home => "Início",
            Anchor::About => "Sobre mim",
            Anchor::Works => "Trabalhos",
            Anchor::Feedback => "Feedbacks",
            Anchor::Contact => "Contato",
        }
    }

    /// Accepts the anchor with or without the leading `#`
    pub fn from_href(href: &str) -> Option<Self> {
        let id = href.trim().trim_start_matches('#');
        Self::ALL
            .into_iter()
            .find(|anchor| &anchor.href()[1..] == id)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href())
    }
}

impl FromStr for Anchor {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_href(s).ok_or_else(|| SiteError::InvalidConfig(format!("unknown anchor '{}'", s)))
    }
}

/// Header menu state
///
/// On narrow viewports the links sit behind a toggle; following a link
/// closes the menu.
#[derive(Debug, Default)]
pub struct NavMenu {
    open: bool,
    current: Option<Anchor>,
}

impl NavMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Follow a link; returns the anchor to scroll to
    pub fn select(&mut self, anchor: Anchor) -> Anchor {
        debug!("NavMenu: navigating to {}", anchor);
        self.open = false;
        self.current = Some(anchor);
        anchor
    }

    /// Last followed link
    pub fn current(&self) -> Option<Anchor> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_names() {
        assert_eq!(Anchor::from_href("#works"), Some(Anchor::Works));
        assert_eq!(Anchor::from_href("feedback"), Some(Anchor::Feedback));
        assert_eq!(Anchor::from_href("#blog"), None);
        assert_eq!("#contact".parse::<Anchor>().unwrap(), Anchor::Contact);
        assert!("#".parse::<Anchor>().is_err());

        for anchor in Anchor::ALL {
            assert_eq!(Anchor::from_href(anchor.href()), Some(anchor));
        }
        assert_eq!(Anchor::About.label(), "Sobre mim");
    }

    #[test]
    fn test_menu_closes_on_select() {
        let mut menu = NavMenu::new();
        assert!(menu.toggle());
        assert!(menu.is_open());

        assert_eq!(menu.select(Anchor::About), Anchor::About);
        assert!(!menu.is_open());
        assert_eq!(menu.current(), Some(Anchor::About));

        menu.toggle();
        menu.close();
        assert!(!menu.is_open());
    }
}
