//! Frontend configuration structures and loaders.
//!
//! Layout and animation settings shared by every host that renders the
//! table, headless or not.

use std::env;

use game_core::TableGeometry;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontendConfig {
    pub table: TableConfig,
    pub animation: AnimationConfig,
}

impl FrontendConfig {
    pub const fn new(table: TableConfig, animation: AnimationConfig) -> Self {
        Self { table, animation }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TABLE_WIDTH` - Table width in pixels (default: 800)
    /// - `TABLE_HEIGHT` - Table height in pixels (default: 800)
    /// - `CARD_SCALE` - Scale applied to the card artwork (default: 0.3)
    /// - `DECK_DROP_RATE` - Deck entry speed in pixels per frame (default: 6.0)
    ///
    /// Missing, unparsable or non-positive values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(width) = read_env_positive("TABLE_WIDTH") {
            config.table.width = width;
        }
        if let Some(height) = read_env_positive("TABLE_HEIGHT") {
            config.table.height = height;
        }
        if let Some(scale) = read_env_positive("CARD_SCALE") {
            config.table.card_scale = scale;
        }
        if let Some(rate) = read_env_positive("DECK_DROP_RATE") {
            config.animation.deck_step_rate = rate;
        }

        config
    }

    pub fn geometry(&self) -> TableGeometry {
        TableGeometry::new(self.table.width, self.table.height, self.table.card_scale)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub width: f32,
    pub height: f32,
    pub card_scale: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            card_scale: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Pixels the deck moves per nominal frame while entering.
    pub deck_step_rate: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            deck_step_rate: 6.0,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_positive(key: &str) -> Option<f32> {
    read_env::<f32>(key).filter(|value| value.is_finite() && *value > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_table() {
        let config = FrontendConfig::default();
        let geometry = config.geometry();
        assert_eq!(geometry, TableGeometry::default());
        assert_eq!(config.animation.deck_step_rate, 6.0);
    }

    #[test]
    fn geometry_scales_the_card_artwork() {
        let config = FrontendConfig::new(
            TableConfig {
                width: 1000.0,
                height: 600.0,
                card_scale: 0.5,
            },
            AnimationConfig::default(),
        );
        let geometry = config.geometry();
        assert_eq!(geometry.center(), (500.0, 300.0));
        assert_eq!(geometry.card_width, 120.0);
        assert_eq!(geometry.card_height, 168.0);
    }
}
