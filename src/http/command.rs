use std::fmt;

use crate::cookie::CookieJar;
use crate::http::request::RequestSpec;
use crate::http::types::HeaderList;
use tracing::debug;

pub const DEFAULT_PROGRAM: &str = "curl";

/// One ready-to-run curl invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlCommand {
    program: String,
    args: Vec<String>,
    save_to_file: bool,
}

impl CurlCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Downloads are exempt from the executor timeout.
    pub fn is_download(&self) -> bool {
        self.save_to_file
    }

    /// Shell-pasteable rendering of the invocation.
    pub fn to_command_line(&self) -> String {
        self.to_string()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a.contains(needle))
    }
}

impl fmt::Display for CurlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// POSIX single-quote an argument unless it only holds shell-safe characters.
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

struct HeaderMemo {
    source: HeaderList,
    args: Vec<String>,
}

struct CookieMemo {
    source: CookieJar,
    header: String,
}

/// Turns a [`RequestSpec`] into a [`CurlCommand`].
///
/// Header flags and the cookie header are memoized per builder and rebuilt
/// only when a spec carries different headers or cookies.
pub struct CommandBuilder {
    program: String,
    headers: Option<HeaderMemo>,
    cookie: Option<CookieMemo>,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            headers: None,
            cookie: None,
        }
    }

    fn header_args(&mut self, headers: &HeaderList) -> &[String] {
        let stale = self
            .headers
            .as_ref()
            .is_none_or(|memo| memo.source != *headers);
        if stale {
            let args = headers
                .iter()
                .flat_map(|(k, v)| ["-H".to_string(), format!("{}: {}", k, v)])
                .collect();
            self.headers = Some(HeaderMemo {
                source: headers.clone(),
                args,
            });
        }
        self.headers.as_ref().map_or(&[], |memo| memo.args.as_slice())
    }

    fn cookie_header(&mut self, cookies: &CookieJar) -> &str {
        let stale = self
            .cookie
            .as_ref()
            .is_none_or(|memo| memo.source != *cookies);
        if stale {
            self.cookie = Some(CookieMemo {
                source: cookies.clone(),
                header: format!("cookie: {}", cookies.header_value()),
            });
        }
        self.cookie.as_ref().map_or("", |memo| memo.header.as_str())
    }

    pub fn build(&mut self, spec: &RequestSpec) -> CurlCommand {
        let mut args = Vec::new();

        if spec.save_to_file {
            args.push("-O".to_string());
        }
        if spec.follow_redirects {
            args.push("--location".to_string());
        }
        if spec.include_headers {
            args.push("-i".to_string());
        }
        if let Some(proxy) = &spec.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(spec.url.clone());

        if let Some(method) = &spec.method {
            args.push("-X".to_string());
            args.push(method.as_str().to_string());
        }

        args.extend_from_slice(self.header_args(&spec.headers));

        // Always present, even for an empty jar
        args.push("-H".to_string());
        args.push(self.cookie_header(&spec.cookies).to_string());

        if let Some(body) = &spec.body {
            args.push("--data-binary".to_string());
            args.push(body.clone());
        } else {
            let flag = if spec.url_encode_form {
                "--data-urlencode"
            } else {
                "-d"
            };
            for field in &spec.form {
                args.push(flag.to_string());
                args.push(field.clone());
            }
        }

        if spec.compressed {
            args.push("--compressed".to_string());
        }

        let command = CurlCommand {
            program: self.program.clone(),
            args,
            save_to_file: spec.save_to_file,
        };
        debug!("Full command formed: {}", command);
        command
    }
}
