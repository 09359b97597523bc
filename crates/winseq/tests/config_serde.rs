#![forbid(unsafe_code)]

//! Configuration loading from JSON.

use std::time::Duration;

use winseq::testing::SimHost;
use winseq::{ConfigError, Virtualizer, VirtualizerConfig};

#[test]
fn config_round_trips_through_json() {
    let config = VirtualizerConfig::default()
        .with_max_virtual_count(50_000)
        .with_reorder_elements(true)
        .with_reorder_delay(Duration::from_millis(250));
    let json = serde_json::to_string(&config).expect("serialize");
    let back: VirtualizerConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, config);
}

#[test]
fn missing_fields_take_defaults() {
    let config: VirtualizerConfig = serde_json::from_str(
        r#"{ "max_virtual_count": 2000, "offset_edge_band": 400, "scroll_line_height": 20.0 }"#,
    )
    .expect("deserialize");
    let defaults = VirtualizerConfig::default();
    assert_eq!(config.max_virtual_count, 2_000);
    assert_eq!(config.offset_edge_band, 400);
    assert_eq!(config.scroll_line_height, 20.0);
    assert_eq!(config.offset_max_shift, defaults.offset_max_shift);
    assert_eq!(config.max_pages, defaults.max_pages);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn bands_filling_the_whole_window_are_rejected() {
    // Default band of 1000 on each edge leaves no middle ground in 2000.
    let config: VirtualizerConfig =
        serde_json::from_str(r#"{ "max_virtual_count": 2000 }"#).expect("deserialize");
    assert_eq!(
        config.validate(),
        Err(ConfigError::EdgeBandTooWide {
            band: 1_000,
            max_virtual_count: 2_000,
        })
    );

    let config: VirtualizerConfig =
        serde_json::from_str(r#"{ "max_virtual_count": 2001 }"#).expect("deserialize");
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn loaded_config_is_validated() {
    let config: VirtualizerConfig =
        serde_json::from_str(r#"{ "max_virtual_count": 1500 }"#).expect("deserialize");
    let err = Virtualizer::new(SimHost::new(20.0), config).expect_err("band too wide");
    assert!(matches!(err, ConfigError::EdgeBandTooWide { .. }));
    assert!(err.to_string().contains("1500"));
}
