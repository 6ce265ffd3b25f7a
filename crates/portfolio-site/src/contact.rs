//! Contact form submission.
//!
//! The form is posted with `fetch` and the result is turned into a status
//! line. Mapping a [`SubmitOutcome`] to a [`FormStatus`] is pure; only
//! [`post_form`] and [`DomContactView`] touch the browser.

use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, FormData, Headers, HtmlElement, HtmlFormElement, Request, RequestInit, Response};

use crate::config::{ContactConfig, ElementIds};
use crate::dom;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Sending,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormStatus {
    pub text: String,
    pub tone: StatusTone,
}

impl FormStatus {
    fn new(text: &str, tone: StatusTone) -> Self {
        Self {
            text: text.to_string(),
            tone,
        }
    }

    pub fn color<'a>(&self, config: &'a ContactConfig) -> &'a str {
        match self.tone {
            StatusTone::Sending => &config.sending_color,
            StatusTone::Success => &config.success_color,
            StatusTone::Error => &config.error_color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The endpoint answered with a 2xx status.
    Accepted,
    /// Any other HTTP status, with the raw response body.
    Rejected { status: u16, body: String },
    /// The request never produced a response.
    Failed(String),
}

pub fn sending_status(config: &ContactConfig) -> FormStatus {
    FormStatus::new(&config.sending_message, StatusTone::Sending)
}

pub fn status_for(outcome: &SubmitOutcome, config: &ContactConfig) -> FormStatus {
    match outcome {
        SubmitOutcome::Accepted => FormStatus::new(&config.success_message, StatusTone::Success),
        SubmitOutcome::Rejected { body, .. } => match rejection_text(body) {
            Some(RejectionText::Errors(text)) => FormStatus::new(&text, StatusTone::Error),
            Some(RejectionText::Generic) => FormStatus::new(&config.failure_message, StatusTone::Error),
            None => FormStatus::new(&config.network_error_message, StatusTone::Error),
        },
        SubmitOutcome::Failed(_) => FormStatus::new(&config.network_error_message, StatusTone::Error),
    }
}

enum RejectionText {
    Errors(String),
    Generic,
}

/// Read an error body of the form `{"errors": [{"message": ...}]}`.
///
/// `None` means the body could not be interpreted at all (not JSON, `null`,
/// or an `errors` value that is not a list), which is reported like a
/// network failure.
fn rejection_text(body: &str) -> Option<RejectionText> {
    let data: Value = serde_json::from_str(body).ok()?;
    let errors = match &data {
        Value::Null => return None,
        Value::Object(map) => match map.get("errors") {
            Some(errors) => errors,
            None => return Some(RejectionText::Generic),
        },
        _ => return Some(RejectionText::Generic),
    };
    let messages = errors
        .as_array()?
        .iter()
        .map(error_message)
        .collect::<Option<Vec<_>>>()?;
    Some(RejectionText::Errors(messages.join(", ")))
}

fn error_message(entry: &Value) -> Option<String> {
    match entry {
        Value::Null => None,
        Value::Object(map) => Some(match map.get("message") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }),
        _ => Some(String::new()),
    }
}

/// Page side of the form: the status line and the form fields.
pub trait ContactView {
    fn show_status(&mut self, text: &str, color: &str);
    fn reset(&mut self);
}

pub fn show<V: ContactView>(view: &mut V, status: &FormStatus, config: &ContactConfig) {
    view.show_status(&status.text, status.color(config));
}

/// Render the result of a submission; a successful one also clears the form.
pub fn apply_outcome<V: ContactView>(view: &mut V, outcome: &SubmitOutcome, config: &ContactConfig) {
    match outcome {
        SubmitOutcome::Accepted => log::info!("contact form sent"),
        SubmitOutcome::Rejected { status, body } => {
            log::warn!("contact form rejected with HTTP {status}: {body}");
        }
        SubmitOutcome::Failed(reason) => log::error!("Form submission error: {reason}"),
    }
    show(view, &status_for(outcome, config), config);
    if *outcome == SubmitOutcome::Accepted {
        view.reset();
    }
}

#[derive(Clone)]
pub struct DomContactView {
    form: HtmlFormElement,
    status: HtmlElement,
}

impl ContactView for DomContactView {
    fn show_status(&mut self, text: &str, color: &str) {
        self.status.set_text_content(Some(text));
        if let Err(e) = self.status.style().set_property("color", color) {
            log::warn!("failed to set status color: {e:?}");
        }
    }

    fn reset(&mut self) {
        self.form.reset();
    }
}

/// POST the form's fields to its `action` URL.
pub async fn post_form(form: &HtmlFormElement) -> Result<SubmitOutcome> {
    let window = dom::window()?;
    let body = FormData::new_with_form(form)?;
    let headers = Headers::new()?;
    headers.set("Accept", "application/json")?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&body);
    init.set_headers(&headers);
    let request = Request::new_with_str_and_init(&form.action(), &init)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if response.ok() {
        return Ok(SubmitOutcome::Accepted);
    }
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok(SubmitOutcome::Rejected {
        status: response.status(),
        body,
    })
}

pub fn install(document: &Document, ids: &ElementIds, config: &ContactConfig) -> Result<()> {
    let form: HtmlFormElement = dom::element_by_id(document, &ids.contact_form, "form")?;
    let status: HtmlElement = dom::element_by_id(document, &ids.form_status, "HTML element")?;
    let view = DomContactView {
        form: form.clone(),
        status,
    };
    let config = config.clone();

    dom::listen(&form, "submit", move |event| {
        event.prevent_default();
        let mut view = view.clone();
        let config = config.clone();
        show(&mut view, &sending_status(&config), &config);

        spawn_local(async move {
            let outcome = post_form(&view.form)
                .await
                .unwrap_or_else(|e| SubmitOutcome::Failed(e.to_string()));
            apply_outcome(&mut view, &outcome, &config);
        });
    })
}
