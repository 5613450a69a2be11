//! Configuration as batch jobs and the CLI see it

use captcha::error::{CaptchaError, FontLoadError};
use captcha::{Captcha, CaptchaConfig, Strategy};

#[test]
fn empty_json_gives_defaults() {
    let config: CaptchaConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, CaptchaConfig::default());
}

#[test]
fn partial_json_overrides_fields() {
    let config: CaptchaConfig =
        serde_json::from_str(r#"{"width": 300, "font_sizes": [30, 36]}"#).unwrap();
    assert_eq!(config.width, 300);
    assert_eq!(config.height, 60);
    assert_eq!(config.font_sizes, vec![30.0, 36.0]);
}

#[test]
fn strategies_deserialize_lowercase() {
    let strategy: Strategy = serde_json::from_str(r#""wheezy""#).unwrap();
    assert_eq!(strategy, Strategy::Wheezy);
    assert_eq!(Strategy::default(), Strategy::Image);
}

#[test]
fn availability_follows_the_build() {
    assert!(Strategy::Image.is_available());
    assert_eq!(Strategy::Wheezy.is_available(), cfg!(feature = "wheezy"));
}

#[cfg(not(feature = "wheezy"))]
#[test]
fn wheezy_without_the_feature_is_a_config_error() {
    assert!(matches!(
        Captcha::new(&CaptchaConfig::wheezy(), Strategy::Wheezy),
        Err(CaptchaError::ConfigError(_))
    ));
}

#[test]
fn zero_height_is_rejected_for_every_strategy() {
    for strategy in Strategy::ALL {
        let config = CaptchaConfig::for_strategy(strategy).with_size(200, 0);
        assert!(matches!(
            Captcha::new(&config, strategy),
            Err(CaptchaError::ConfigError(_))
        ));
    }
}

#[test]
fn empty_font_list_depends_on_the_host() {
    let config = CaptchaConfig::default();
    assert!(config.fonts.is_empty());
    match Captcha::new(&config, Strategy::Image) {
        Ok(captcha) => assert_eq!(captcha.dimensions(), (160, 60)),
        Err(CaptchaError::FontLoad(FontLoadError::NoSystemFonts)) => {},
        Err(e) => panic!("unexpected error: {}", e),
    }
}
