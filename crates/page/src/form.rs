use async_trait::async_trait;
use frame_config::FormConfig;
use frame_core::Result;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Field values in document order, as read from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// JSON object body; a repeated field name keeps its last value.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Sends a JSON body and reports the HTTP status.
#[async_trait(?Send)]
pub trait FormTransport {
    async fn post_json(&self, action: &str, body: &Value) -> Result<u16>;
}

/// State of a form's submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitControl {
    #[default]
    Enabled,
    Disabled,
    Hidden,
}

/// What the host should do after a submission settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub accepted:      bool,
    /// Clear the form fields now.
    pub reset_form:    bool,
    /// Call [`FormSubmitter::restore`] after this delay.
    pub restore_after: Duration,
}

/// Submits a form as JSON instead of navigating, and drives its submit
/// control: disabled while in flight, hidden for a while after success,
/// re-enabled shortly after failure.
#[derive(Debug, Clone)]
pub struct FormSubmitter {
    config:  FormConfig,
    control: SubmitControl,
}

impl FormSubmitter {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            control: SubmitControl::Enabled,
        }
    }

    pub fn control(&self) -> SubmitControl {
        self.control
    }

    /// Returns `None` when the control is not enabled (a submission is in
    /// flight or cooling down); the click is ignored.
    pub async fn submit(
        &mut self,
        data: &FormData,
        transport: &dyn FormTransport,
    ) -> Option<SubmitOutcome> {
        if self.control != SubmitControl::Enabled {
            debug!("{}: submit ignored while {:?}", self.config.id, self.control);
            return None;
        }

        self.control = SubmitControl::Disabled;
        let status = transport.post_json(&self.config.action, &data.to_json()).await;

        let outcome = match status {
            Ok(200) => {
                self.control = SubmitControl::Hidden;
                SubmitOutcome {
                    accepted:      true,
                    reset_form:    true,
                    restore_after: Duration::from_millis(self.config.success_cooldown_ms),
                }
            }
            other => {
                match other {
                    Ok(code) => warn!("{}: {} answered {code}", self.config.id, self.config.action),
                    Err(e)   => warn!("{}: submit failed: {e}", self.config.id),
                }
                SubmitOutcome {
                    accepted:      false,
                    reset_form:    false,
                    restore_after: Duration::from_millis(self.config.failure_cooldown_ms),
                }
            }
        };
        Some(outcome)
    }

    /// Bring the submit control back after the cooldown.
    pub fn restore(&mut self) {
        self.control = SubmitControl::Enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_core::FrameError;
    use std::cell::RefCell;

    struct Fixed {
        status: Option<u16>,
        bodies: RefCell<Vec<(String, Value)>>,
    }

    impl Fixed {
        fn new(status: Option<u16>) -> Self {
            Self { status, bodies: RefCell::new(Vec::new()) }
        }
    }

    #[async_trait(?Send)]
    impl FormTransport for Fixed {
        async fn post_json(&self, action: &str, body: &Value) -> Result<u16> {
            self.bodies.borrow_mut().push((action.to_string(), body.clone()));
            self.status.ok_or_else(|| FrameError::Page("connection refused".into()))
        }
    }

    fn form() -> FormConfig {
        FormConfig {
            id: "feedback".into(),
            action: "/feedback".into(),
            fields: vec!["message".into()],
            success_cooldown_ms: 5_000,
            failure_cooldown_ms: 1_000,
        }
    }

    #[test]
    fn later_duplicate_fields_win() {
        let data: FormData = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(data.to_json(), serde_json::json!({"a": "3", "b": "2"}));
    }

    #[tokio::test]
    async fn success_hides_control_and_resets() {
        let transport = Fixed::new(Some(200));
        let mut submitter = FormSubmitter::new(form());
        let data: FormData = [("message", "hi")].into_iter().collect();

        let outcome = submitter.submit(&data, &transport).await.unwrap();

        assert!(outcome.accepted && outcome.reset_form);
        assert_eq!(outcome.restore_after, Duration::from_secs(5));
        assert_eq!(submitter.control(), SubmitControl::Hidden);
        assert_eq!(
            transport.bodies.borrow()[0],
            ("/feedback".to_string(), serde_json::json!({"message": "hi"}))
        );

        assert!(submitter.submit(&data, &transport).await.is_none());
        submitter.restore();
        assert_eq!(submitter.control(), SubmitControl::Enabled);
    }

    #[tokio::test]
    async fn rejection_and_transport_error_keep_form() {
        for status in [Some(400), None] {
            let transport = Fixed::new(status);
            let mut submitter = FormSubmitter::new(form());

            let outcome = submitter.submit(&FormData::new(), &transport).await.unwrap();

            assert!(!outcome.accepted && !outcome.reset_form);
            assert_eq!(outcome.restore_after, Duration::from_secs(1));
            assert_eq!(submitter.control(), SubmitControl::Disabled);
        }
    }
}
