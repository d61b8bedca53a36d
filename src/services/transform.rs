// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HTML to readable Markdown.
//!
//! The [`ContentTransformer`] trait is the seam between the pipeline and the
//! parse / extract / serialize strategy. [`ReadableMarkdown`] isolates the
//! main content with the readability pre-filter and converts it with `htmd`.

use crate::services::readability::{self, ExtractError};
use htmd::options::{CodeBlockStyle, HeadingStyle, LinkStyle, Options};
use htmd::HtmlToMarkdown;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("transform failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("transformer panicked: {0}")]
    Panicked(String),
    #[error("transform produced no content")]
    Empty,
}

/// Converts an HTML document into text for the caller.
pub trait ContentTransformer: Send + Sync {
    /// Transform `html`. `base_url` is the document location, used to
    /// resolve relative links.
    fn transform(&self, html: &str, base_url: Option<&Url>) -> Result<String, TransformError>;
}

/// Readability extraction followed by Markdown serialization.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadableMarkdown;

impl ReadableMarkdown {
    fn converter() -> HtmlToMarkdown {
        let options = Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            link_style: LinkStyle::Inlined,
            ..Default::default()
        };
        HtmlToMarkdown::builder().options(options).build()
    }
}

fn convert(converter: &HtmlToMarkdown, html: &str) -> Result<String, TransformError> {
    let markdown = converter
        .convert(html)
        .map_err(|e| TransformError::Failed(e.to_string()))?;
    Ok(markdown.trim().to_string())
}

impl ContentTransformer for ReadableMarkdown {
    fn transform(&self, html: &str, base_url: Option<&Url>) -> Result<String, TransformError> {
        let extraction = readability::extract(html, base_url)?;
        let converter = Self::converter();

        if let Some(primary) = &extraction.primary {
            let body = convert(&converter, primary)?;
            if !body.is_empty() {
                return Ok(match extraction.headline {
                    Some(headline) => format!("# {}\n\n{}", headline, body),
                    None => body,
                });
            }
        }

        convert(&converter, &extraction.document)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}

/// Run `transformer` over `html`, turning a panic into
/// [`TransformError::Panicked`]. Empty output from non-blank input counts as
/// a failure.
pub fn transform_checked(
    transformer: &dyn ContentTransformer,
    html: &str,
    base_url: Option<&Url>,
) -> Result<String, TransformError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| transformer.transform(html, base_url)));
    match outcome {
        Ok(Ok(markdown)) if markdown.is_empty() && !html.trim().is_empty() => {
            Err(TransformError::Empty)
        }
        Ok(result) => result,
        Err(payload) => Err(TransformError::Panicked(panic_message(payload))),
    }
}

/// Run `transformer` over `html`; on any failure hand back the original
/// HTML together with the error.
pub fn transform_or_original(
    transformer: &dyn ContentTransformer,
    html: String,
    base_url: Option<&Url>,
) -> (String, Option<TransformError>) {
    match transform_checked(transformer, &html, base_url) {
        Ok(markdown) => (markdown, None),
        Err(e) => (html, Some(e)),
    }
}
