/// lib.rs - image-switcher 的库根模块
/// 两槽位图像切换引擎：当前图像 + 即将到来的图像，逐帧计算两者的位置、缩放和不透明度。

/// 启用 tracing 宏的全局引入（debug!、trace! 等）
#[macro_use]
extern crate tracing;

/// 缓动曲线、时钟与进度动画
pub mod animation;

/// 演示程序的命令行参数
pub mod cli;

/// 可调参数及其加载
pub mod config;

/// 在图像列表中前后浏览的驱动逻辑
pub mod navigator;

/// 绘制快照与软件绘制器
pub mod render;

/// 切换器状态机、槽位、通道规则与手势变换
pub mod switcher;

/// 几何类型与杂项工具
pub mod utils;
