//! Size and aspect based region labelling.

use serde::{Deserialize, Serialize};

use regionscan_core::{Rect, RegionLabel};

/// Thresholds used by [`RegionClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Maximum side length of an icon
    pub icon_max_side: u32,
    /// Maximum side length of an avatar
    pub avatar_max_side: u32,
    /// Allowed deviation of an avatar's aspect from 1.0
    pub avatar_aspect_tolerance: f32,
    /// Aspect above which a region is a banner
    pub banner_min_aspect: f32,
    /// Aspect below which a region is a sidebar
    pub sidebar_max_aspect: f32,
    /// Allowed deviation of a square's aspect from 1.0
    pub square_aspect_tolerance: f32,
    /// Maximum height of a button
    pub button_max_height: u32,
    /// Minimum aspect of a button
    pub button_min_aspect: f32,
    /// Minimum side length of a card
    pub card_min_side: u32,
    /// Minimum area of a dashboard card
    pub dashboard_card_min_area: u64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            icon_max_side: 64,
            avatar_max_side: 120,
            avatar_aspect_tolerance: 0.2,
            banner_min_aspect: 3.0,
            sidebar_max_aspect: 0.33,
            square_aspect_tolerance: 0.25,
            button_max_height: 60,
            button_min_aspect: 1.5,
            card_min_side: 100,
            dashboard_card_min_area: 300_000,
        }
    }
}

/// Pure decision table from box size to a semantic label.
///
/// Rules are checked in order and the first match wins:
///
/// | Rule | Label |
/// |------|-------|
/// | both sides ≤ icon max | icon |
/// | both sides ≤ avatar max, aspect ≈ 1 | avatar |
/// | aspect > banner min | banner |
/// | aspect < sidebar max | sidebar |
/// | aspect ≈ 1 | square |
/// | height ≤ button max, aspect ≥ button min | button |
/// | both sides ≥ card min | card / dashboard card |
/// | both sides > icon max | image |
/// | otherwise | component |
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionClassifier {
    thresholds: ClassifierThresholds,
}

impl RegionClassifier {
    /// Create a classifier with custom thresholds.
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Label a rectangle.
    pub fn classify_rect(&self, rect: &Rect) -> RegionLabel {
        self.classify(rect.width, rect.height)
    }

    /// Label a width/height pair.
    pub fn classify(&self, width: u32, height: u32) -> RegionLabel {
        let t = &self.thresholds;
        if height == 0 {
            return RegionLabel::Component;
        }
        let aspect = width as f32 / height as f32;

        if width <= t.icon_max_side && height <= t.icon_max_side {
            return RegionLabel::Icon;
        }
        if width <= t.avatar_max_side
            && height <= t.avatar_max_side
            && (aspect - 1.0).abs() <= t.avatar_aspect_tolerance
        {
            return RegionLabel::Avatar;
        }
        if aspect > t.banner_min_aspect {
            return RegionLabel::Banner;
        }
        if aspect < t.sidebar_max_aspect {
            return RegionLabel::Sidebar;
        }
        if (aspect - 1.0).abs() <= t.square_aspect_tolerance {
            return RegionLabel::Square;
        }
        if height <= t.button_max_height && aspect >= t.button_min_aspect {
            return RegionLabel::Button;
        }
        if width >= t.card_min_side && height >= t.card_min_side {
            if width as u64 * height as u64 >= t.dashboard_card_min_area {
                return RegionLabel::DashboardCard;
            }
            return RegionLabel::Card;
        }
        if width > t.icon_max_side && height > t.icon_max_side {
            return RegionLabel::Image;
        }
        RegionLabel::Component
    }
}
