use std::fmt;

use quick_xml::escape::escape;

use crate::constants::{TRANSPORT_FAILURE_CODE, TRANSPORT_FAILURE_REQUEST_ID};
use crate::xml::{XmlDocument, XmlValue};

/// One error reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Machine readable error code, like `LoadBalancerNotFound`.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

/// Errors reported by the service for one request.
///
/// Transport failures and `5xx` responses are reported the same way, with
/// request id `N/A` and code `HTTP POST FAILURE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// Request id returned by the service, empty if absent.
    pub request_id: String,
    /// Errors in document order.
    pub errors: Vec<ApiError>,
}

impl ApiErrorResponse {
    /// Extract the request id and every error from a response document.
    ///
    /// Both `<Errors><Error/>...</Errors>` and the `<Error/>` children of an
    /// `<ErrorResponse>` root are collected.
    pub fn from_document(doc: &XmlDocument) -> Self {
        let mut errors = Vec::new();

        let nested = doc
            .get("Errors")
            .into_iter()
            .flat_map(XmlValue::iter)
            .filter_map(XmlValue::as_node)
            .filter_map(|v| v.get("Error"));
        for entry in nested.chain(doc.get("Error")).flat_map(XmlValue::iter) {
            let Some(node) = entry.as_node() else {
                continue;
            };
            errors.push(ApiError {
                code: node.text("Code").unwrap_or_default().to_string(),
                message: node.text("Message").unwrap_or_default().to_string(),
            });
        }

        Self {
            request_id: doc.request_id().unwrap_or_default().to_string(),
            errors,
        }
    }

    /// Check whether this came from a failed round trip instead of the service.
    pub fn is_transport_failure(&self) -> bool {
        self.request_id == TRANSPORT_FAILURE_REQUEST_ID
            && self.errors.iter().any(|e| e.code == TRANSPORT_FAILURE_CODE)
    }
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request {} failed", self.request_id)?;
        for (idx, err) in self.errors.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", err.code, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiErrorResponse {}

/// Error returned by the ELB operations.
#[derive(Debug, thiserror::Error)]
pub enum ElbError {
    /// The request could not be built, signed or understood.
    #[error(transparent)]
    Client(#[from] elbsign_core::Error),
    /// The service, or the transport, reported errors.
    #[error(transparent)]
    Api(#[from] ApiErrorResponse),
}

impl ElbError {
    /// Get the service errors if there are any.
    pub fn api_errors(&self) -> Option<&ApiErrorResponse> {
        match self {
            ElbError::Api(v) => Some(v),
            ElbError::Client(_) => None,
        }
    }
}

/// Build the document reported in place of a failed round trip.
pub(crate) fn transport_failure_document(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<xml><RequestID>{}</RequestID><Errors><Error><Code>{}</Code><Message>{}</Message></Error></Errors></xml>",
        TRANSPORT_FAILURE_REQUEST_ID,
        TRANSPORT_FAILURE_CODE,
        escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use elbsign_core::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_errors_keep_document_order() -> Result<()> {
        let doc = XmlDocument::parse(
            r#"<Response>
  <Errors>
    <Error><Code>InvalidInstance</Code><Message>i-111 is not valid</Message></Error>
    <Error><Code>Throttling</Code><Message>Rate exceeded</Message></Error>
  </Errors>
  <RequestID>req-1</RequestID>
</Response>"#,
        )?;
        let resp = ApiErrorResponse::from_document(&doc);

        assert_eq!(
            resp,
            ApiErrorResponse {
                request_id: "req-1".to_string(),
                errors: vec![
                    ApiError {
                        code: "InvalidInstance".to_string(),
                        message: "i-111 is not valid".to_string(),
                    },
                    ApiError {
                        code: "Throttling".to_string(),
                        message: "Rate exceeded".to_string(),
                    },
                ],
            }
        );
        assert!(!resp.is_transport_failure());
        assert_eq!(
            resp.to_string(),
            "request req-1 failed: InvalidInstance: i-111 is not valid; Throttling: Rate exceeded"
        );

        Ok(())
    }

    #[test]
    fn test_aws_error_response() -> Result<()> {
        let doc = XmlDocument::parse(
            r#"<ErrorResponse xmlns="http://elasticloadbalancing.amazonaws.com/doc/2009-05-15/">
  <Error>
    <Type>Sender</Type>
    <Code>LoadBalancerNotFound</Code>
    <Message>There is no ACTIVE Load Balancer named 'lb1'</Message>
  </Error>
  <RequestId>0f1a2b3c</RequestId>
</ErrorResponse>"#,
        )?;
        let resp = ApiErrorResponse::from_document(&doc);

        assert_eq!(resp.request_id, "0f1a2b3c");
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].code, "LoadBalancerNotFound");

        Ok(())
    }

    #[test]
    fn test_transport_failure_document() -> Result<()> {
        let doc = XmlDocument::parse(&transport_failure_document("connect <refused> & gone"))?;
        assert!(doc.has_errors());

        let resp = ApiErrorResponse::from_document(&doc);
        assert!(resp.is_transport_failure());
        assert_eq!(resp.request_id, "N/A");
        assert_eq!(
            resp.errors,
            vec![ApiError {
                code: "HTTP POST FAILURE".to_string(),
                message: "connect <refused> & gone".to_string(),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_error_fields_are_copied_verbatim() -> Result<()> {
        let doc = XmlDocument::parse(
            "<Response>\n  <Errors>\n    <Error>\n      <Code> Padded </Code>\n      <Message>  padded message  </Message>\n    </Error>\n  </Errors>\n</Response>",
        )?;
        let resp = ApiErrorResponse::from_document(&doc);

        assert_eq!(
            resp.errors,
            vec![ApiError {
                code: " Padded ".to_string(),
                message: "  padded message  ".to_string(),
            }]
        );

        let doc = XmlDocument::parse(&transport_failure_document(" spaced out "))?;
        assert_eq!(
            ApiErrorResponse::from_document(&doc).errors[0].message,
            " spaced out "
        );

        Ok(())
    }

    #[test]
    fn test_elb_error_from() {
        let err: ElbError = elbsign_core::Error::request_invalid("bad").into();
        assert!(err.api_errors().is_none());

        let err: ElbError = ApiErrorResponse {
            request_id: "N/A".to_string(),
            errors: vec![],
        }
        .into();
        assert_eq!(err.to_string(), "request N/A failed");
    }
}
