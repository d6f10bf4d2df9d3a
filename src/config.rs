/// config.rs - 切换器的可调参数
/// 职责：定义配置结构、从 JSON 文件加载并校验取值范围
/// 说明：淡入起点、缩放起点、缩放吸附范围等都是经验调校值，集中放在配置里而不是写死在算法中；
///       字段名使用 kebab-case，未写出的字段取默认值

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    pub animation: AnimationConfig,
    /// 淡入/淡出通道的起始不透明度
    pub alpha_start: f64,
    /// 缩放通道的起始比例（相对适配缩放）
    pub scale_start: f64,
    pub zoom: ZoomConfig,
    /// 按键触发的回弹动画在多大进度处折返
    pub bounce_turn_point: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct AnimationConfig {
    /// 关闭后所有切换立即完成
    pub off: bool,
    /// 全局减速倍数，2 表示动画慢一倍，0 表示冻结
    pub slowdown: f64,
    pub duration_ms: u32,
    pub curve: AnimationCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationCurve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ZoomConfig {
    /// 最大缩放，以适配缩放的倍数表示
    pub max_factor: f64,
    /// 最小缩放的上限；图像本身需要更小的比例才能放下时以后者为准
    pub min_scale: f64,
    /// 落在适配缩放 ±snap_band 比例内时吸附回适配缩放
    pub snap_band: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            alpha_start: 0.4,
            scale_start: 0.4,
            zoom: ZoomConfig::default(),
            bounce_turn_point: 0.15,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            off: false,
            slowdown: 1.,
            duration_ms: 500,
            curve: AnimationCurve::EaseOutQuad,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            max_factor: 64.,
            min_scale: 0.1,
            snap_band: 0.02,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(&contents).context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        fn check_fraction(name: &str, value: f64) -> anyhow::Result<()> {
            anyhow::ensure!(
                (0. ..=1.).contains(&value),
                "{name} must be between 0 and 1, got {value}"
            );
            Ok(())
        }

        check_fraction("alpha-start", self.alpha_start)?;
        check_fraction("scale-start", self.scale_start)?;
        check_fraction("bounce-turn-point", self.bounce_turn_point)?;
        check_fraction("zoom.snap-band", self.zoom.snap_band)?;
        // 0 表示冻结，负数和 NaN 没有意义
        anyhow::ensure!(
            self.animation.slowdown.is_finite() && self.animation.slowdown >= 0.,
            "animation.slowdown must be a non-negative number, got {}",
            self.animation.slowdown
        );
        anyhow::ensure!(
            self.zoom.max_factor >= 1.,
            "zoom.max-factor must be at least 1, got {}",
            self.zoom.max_factor
        );
        anyhow::ensure!(
            self.zoom.min_scale > 0.,
            "zoom.min-scale must be positive, got {}",
            self.zoom.min_scale
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn parse_partial() {
        let config = Config::parse(
            r#"{
                "animation": { "duration-ms": 300, "curve": "ease-out-cubic" },
                "zoom": { "snap-band": 0.05 }
            }"#,
        )
        .unwrap();

        assert_debug_snapshot!(config, @r"
        Config {
            animation: AnimationConfig {
                off: false,
                slowdown: 1.0,
                duration_ms: 300,
                curve: EaseOutCubic,
            },
            alpha_start: 0.4,
            scale_start: 0.4,
            zoom: ZoomConfig {
                max_factor: 64.0,
                min_scale: 0.1,
                snap_band: 0.05,
            },
            bounce_turn_point: 0.15,
        }
        ");
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(Config::parse(r#"{ "durration": 5 }"#).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        let err = Config::parse(r#"{ "alpha-start": 1.5 }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "alpha-start must be between 0 and 1, got 1.5"
        );
        assert!(Config::parse(r#"{ "zoom": { "max-factor": 0.5 } }"#).is_err());
        assert!(Config::parse(r#"{ "animation": { "slowdown": -2 } }"#).is_err());
    }
}
