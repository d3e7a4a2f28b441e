// ABOUTME: Generic HTTP request tools (GET, POST, PATCH, PUT, DELETE) returning the response body as text.
// ABOUTME: Any URL is allowed; the shared client carries browser-like default headers.

use serde_json::{Value, json};

use super::{ToolError, ToolOutput, string_arg};

/// HTTP verbs exposed as separate tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 5] = [
        RequestMethod::Get,
        RequestMethod::Post,
        RequestMethod::Patch,
        RequestMethod::Put,
        RequestMethod::Delete,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            RequestMethod::Get => "requests_get",
            RequestMethod::Post => "requests_post",
            RequestMethod::Patch => "requests_patch",
            RequestMethod::Put => "requests_put",
            RequestMethod::Delete => "requests_delete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RequestMethod::Get => {
                "A portal to the internet. Use this when you need to get specific content from a \
                 website. Input is a url. The output is the text response of the GET request."
            }
            RequestMethod::Post => {
                "Use this when you want to POST to a website. Input is a url and the data to \
                 send as the request body. The output is the text response of the POST request."
            }
            RequestMethod::Patch => {
                "Use this when you want to PATCH content on a website. Input is a url and the \
                 data to send as the request body. The output is the text response of the PATCH request."
            }
            RequestMethod::Put => {
                "Use this when you want to PUT to a website. Input is a url and the data to send \
                 as the request body. The output is the text response of the PUT request."
            }
            RequestMethod::Delete => {
                "A portal to the internet. Use this when you need to make a DELETE request to a \
                 URL. Input is a url. The output is the text response of the DELETE request."
            }
        }
    }

    /// Whether the verb carries a request body.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            RequestMethod::Post | RequestMethod::Patch | RequestMethod::Put
        )
    }

    fn as_http(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    pub fn parameters(&self) -> Value {
        if self.has_body() {
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to send the request to."
                    },
                    "data": {
                        "description": "The request body. Objects and arrays are sent as JSON, strings as-is."
                    }
                },
                "required": ["url", "data"]
            })
        } else {
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to send the request to."
                    }
                },
                "required": ["url"]
            })
        }
    }
}

/// One HTTP verb bound to the shared client.
#[derive(Debug, Clone)]
pub struct RequestTool {
    pub method: RequestMethod,
    http: reqwest::Client,
}

impl RequestTool {
    pub fn new(method: RequestMethod, http: reqwest::Client) -> Self {
        Self { method, http }
    }

    pub(crate) async fn invoke(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let request = self.build(arguments)?;
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(
            method = %self.method.as_http(),
            status = %status,
            bytes = body.len(),
            "http tool request completed"
        );
        Ok(ToolOutput::Text(body))
    }

    /// Turn tool arguments into a ready-to-send request.
    pub fn build(&self, arguments: &Value) -> Result<reqwest::Request, ToolError> {
        let url = string_arg(arguments, &["url"])?;
        let mut builder = self.http.request(self.method.as_http(), url.as_str());

        if self.method.has_body() {
            builder = match arguments.get("data") {
                Some(Value::String(text)) => builder.body(text.clone()),
                Some(Value::Null) | None => {
                    return Err(ToolError::InvalidInput(
                        "missing argument 'data'".to_string(),
                    ));
                }
                Some(other) => builder.json(other),
            };
        }

        Ok(builder.build()?)
    }
}
