use frame_config::{WidgetConfig, WidgetKind};
use frame_core::{Part, Result};
use tracing::debug;

/// Build a widget config from the attributes found on its host element.
///
/// Attributes the widget does not observe (`class`, `style`, ...) are
/// skipped.  The result is validated, so a missing `src` fails here rather
/// than at activation.
pub fn config_from_attributes<I, K, V>(kind: WidgetKind, id: &str, attrs: I) -> Result<WidgetConfig>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut config = WidgetConfig {
        kind,
        ..WidgetConfig::new(id, "")
    };
    for (key, value) in attrs {
        if !config.apply_attribute(key.as_ref(), value.as_ref())? {
            debug!("{id}: skipping attribute '{}'", key.as_ref());
        }
    }
    config.validate()?;
    Ok(config)
}

/// CSS selector locating `part` inside a widget root.
pub fn part_selector(part: Part) -> String {
    format!(".{}", part.element_id())
}
