use crate::error::{BraviaError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SOAP action header value for IRCC button presses
pub const IRCC_SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const IRCC_SERVICE: &str = "urn:schemas-sony-com:service:IRCC:1";

/// JSON-RPC service paths
pub mod service {
    pub const ACCESS_CONTROL: &str = "sony/accessControl";
    pub const AV_CONTENT: &str = "sony/avContent";
    pub const SYSTEM: &str = "sony/system";
    pub const AUDIO: &str = "sony/audio";
    pub const APP_CONTROL: &str = "sony/appControl";
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u32,
    pub version: String,
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

impl Request {
    /// Create a request with an empty parameter list
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            id: 1,
            version: "1.0".to_string(),
        }
    }

    /// Set the single parameter object (`params: [params]`)
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = vec![params];
        self
    }

    /// Set the parameter list verbatim
    pub fn with_param_list(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

impl Response {
    /// Check if the response carries an `error` member
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_null())
    }

    /// Convert the `error` member into a typed error.
    ///
    /// The TV reports errors as `[code, "message"]`.
    pub fn api_error(&self) -> Option<BraviaError> {
        if !self.has_error() {
            return None;
        }
        let (code, message) = match self.error.as_ref()? {
            Value::Array(items) => (
                items.first().and_then(Value::as_i64).unwrap_or_default(),
                items
                    .get(1)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            other => (0, other.to_string()),
        };
        Some(BraviaError::Api { code, message })
    }

    /// Return the `result` array or the API error
    pub fn into_result(self) -> Result<Vec<Value>> {
        if let Some(err) = self.api_error() {
            return Err(err);
        }
        self.result
            .ok_or_else(|| BraviaError::InvalidResponse("No result in response".to_string()))
    }
}

/// Build the SOAP envelope for an IRCC button press
pub fn ircc_envelope(code: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(BytesStart::new("s:Envelope").with_attributes([
        ("xmlns:s", SOAP_ENVELOPE_NS),
        ("s:encodingStyle", SOAP_ENCODING),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("s:Body")))?;
    writer.write_event(Event::Start(
        BytesStart::new("u:X_SendIRCC").with_attributes([("xmlns:u", IRCC_SERVICE)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("IRCCCode")))?;
    writer.write_event(Event::Text(BytesText::new(code)))?;
    writer.write_event(Event::End(BytesEnd::new("IRCCCode")))?;
    writer.write_event(Event::End(BytesEnd::new("u:X_SendIRCC")))?;
    writer.write_event(Event::End(BytesEnd::new("s:Body")))?;
    writer.write_event(Event::End(BytesEnd::new("s:Envelope")))?;

    Ok(writer.into_inner())
}

#[derive(Debug, Deserialize)]
struct DialAppList {
    #[serde(rename = "app", default)]
    apps: Vec<DialApp>,
}

#[derive(Debug, Deserialize)]
struct DialApp {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Parse a DIAL app list into `(name, id)` pairs in document order.
///
/// Entries without a name or id are skipped.
pub fn parse_dial_app_list(xml: &str) -> Result<Vec<(String, String)>> {
    let list: DialAppList = quick_xml::de::from_str(xml)?;

    Ok(list
        .apps
        .into_iter()
        .filter_map(|app| {
            let name = app.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
            let id = app.id.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())?;
            Some((name, id))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_params_has_empty_list() {
        let value = serde_json::to_value(Request::new("getPowerStatus")).unwrap();
        assert_eq!(
            value,
            json!({"method": "getPowerStatus", "params": [], "id": 1, "version": "1.0"})
        );
    }

    #[test]
    fn request_wraps_params_in_list() {
        let value = serde_json::to_value(
            Request::new("setPlayContent").with_params(json!({"uri": "tv:dvbt?trip=1"})),
        )
        .unwrap();
        assert_eq!(value["params"], json!([{"uri": "tv:dvbt?trip=1"}]));
    }

    #[test]
    fn error_member_becomes_api_error() {
        let response: Response =
            serde_json::from_value(json!({"error": [7, "Illegal State"], "id": 1})).unwrap();
        assert!(response.has_error());
        match response.into_result() {
            Err(BraviaError::Api { code, message }) => {
                assert_eq!(code, 7);
                assert_eq!(message, "Illegal State");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn null_error_member_is_ignored() {
        let response: Response =
            serde_json::from_value(json!({"result": [0], "error": null, "id": 1})).unwrap();
        assert!(!response.has_error());
        assert!(response.api_error().is_none());
        assert_eq!(response.into_result().unwrap(), vec![json!(0)]);
    }

    #[test]
    fn missing_result_is_invalid() {
        let response: Response = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(matches!(
            response.into_result(),
            Err(BraviaError::InvalidResponse(_))
        ));
    }

    #[test]
    fn ircc_envelope_carries_code() {
        let body = String::from_utf8(ircc_envelope("AAAAAQAAAAEAAAASAw==").unwrap()).unwrap();
        assert!(body.starts_with("<?xml version=\"1.0\"?>"));
        assert!(body.contains(
            "<u:X_SendIRCC xmlns:u=\"urn:schemas-sony-com:service:IRCC:1\"><IRCCCode>AAAAAQAAAAEAAAASAw==</IRCCCode></u:X_SendIRCC>"
        ));
        assert!(body.ends_with("</s:Body></s:Envelope>"));
    }

    #[test]
    fn dial_app_list_skips_incomplete_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <service>
              <app><name>YouTube</name><id>com.sony.dtv.youtube</id><icon_url>x.png</icon_url></app>
              <app><name></name><id>com.sony.dtv.hidden</id></app>
              <app><name>Netflix</name><id>com.sony.dtv.netflix</id></app>
            </service>"#;

        let apps = parse_dial_app_list(xml).unwrap();
        assert_eq!(
            apps,
            vec![
                ("YouTube".to_string(), "com.sony.dtv.youtube".to_string()),
                ("Netflix".to_string(), "com.sony.dtv.netflix".to_string()),
            ]
        );
    }
}
