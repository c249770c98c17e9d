//! 核心宏定义

/// 为配置结构体实现 Default trait 的宏
///
/// 使用示例:
/// ```rust
/// struct RetryPolicy {
///     attempts: u32,
///     label: String,
/// }
///
/// tms_runner::impl_default!(RetryPolicy {
///     attempts: 0,
///     label: String::from("none"),
/// });
///
/// assert_eq!(RetryPolicy::default().attempts, 0);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
