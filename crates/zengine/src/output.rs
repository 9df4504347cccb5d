use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use zengine_fetch::{PlainHeaders, Response};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    status: u16,
    status_text: &'a str,
    ok: bool,
    headers: PlainHeaders,
    body: String,
}

pub fn print_response(response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                status: response.status().as_u16(),
                status_text: response.status_text(),
                ok: response.ok(),
                headers: response.headers().to_plain(),
                body: response.text().into_owned(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec![
                    "status".to_string(),
                    format!("{} {}", response.status().as_u16(), response.status_text()),
                ]);
            for (name, value) in response.headers().iter() {
                table.add_row(vec![format!("header {name}"), value.to_string()]);
            }
            table.add_row(vec!["body".to_string(), response.text().into_owned()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} bytes)",
                response.status().as_u16(),
                response.status_text(),
                response.bytes().len()
            );
            for (name, value) in response.headers().iter() {
                println!("{name}: {value}");
            }
            println!();
            println!("{}", pretty_body(response));
        }
        OutputFormat::Raw => {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(&response.bytes());
            let _ = stdout.flush();
        }
    }
}

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{value}"),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY", "VALUE"]);
            match value {
                Value::Object(map) => {
                    for (key, item) in map {
                        table.add_row(vec![key.clone(), item.to_string()]);
                    }
                }
                other => {
                    table.add_row(vec!["value".to_string(), other.to_string()]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        ),
        OutputFormat::Raw => match value {
            Value::String(text) => print!("{text}"),
            other => print!("{other}"),
        },
    }
}

/// Indented JSON when the body parses, the text as-is otherwise.
fn pretty_body(response: &Response) -> String {
    response
        .json::<Value>()
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| response.text().into_owned())
}

#[cfg(test)]
mod tests {
    use zengine_fetch::{Headers, ResponseInit};

    use super::*;

    #[test]
    fn pretty_body_indents_json_and_keeps_text() {
        let json = Response::new(r#"{"a":1}"#, ResponseInit::default());
        assert_eq!(pretty_body(&json), "{\n  \"a\": 1\n}");

        let text = Response::new(
            "plain",
            ResponseInit {
                headers: Headers::from_pairs([("content-type", "text/plain")]).unwrap(),
                ..ResponseInit::default()
            },
        );
        assert_eq!(pretty_body(&text), "plain");
    }
}
