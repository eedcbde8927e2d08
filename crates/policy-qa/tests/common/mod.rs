//! Fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use policy_qa::ingestion::PdfBackend;
use policy_qa::providers::{CompletionRequest, LlmProvider};
use policy_qa::{AppConfig, Error, PolicyAssistant, Result};

/// Replays canned replies in order and records every request
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(Error::llm(message)),
            None => Err(Error::llm("no scripted reply left")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Reads the staged file as UTF-8 with pages separated by form feeds
pub struct PlainTextPdf;

impl PdfBackend for PlainTextPdf {
    fn extract_pages(&self, path: &Path, on_page: &mut dyn FnMut(u32, String)) -> Result<()> {
        let raw = std::fs::read(path)?;
        let text = String::from_utf8(raw)
            .map_err(|e| Error::file_parse(path.display().to_string(), e.to_string()))?;
        for (i, page) in text.split('\x0c').enumerate() {
            on_page(i as u32 + 1, page.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

pub const HANDBOOK: &str = "Annual leave policy: employees receive 25 days of paid leave per year.\n\n\
Office hours are 9:00 to 17:00, Monday to Friday.\n\x0c\
Sick leave rules: notify your manager before 10:00 on the first day.\n\n\
Dress code: business casual.";

/// Small chunks without overlap, so each handbook paragraph is its own chunk
pub fn paragraph_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.chunking.chunk_size = 60;
    config.chunking.chunk_overlap = 0;
    config
}

pub fn assistant(llm: Arc<ScriptedLlm>) -> PolicyAssistant {
    assistant_with(&paragraph_config(), llm)
}

pub fn assistant_with(config: &AppConfig, llm: Arc<ScriptedLlm>) -> PolicyAssistant {
    PolicyAssistant::with_backend(config, llm, Arc::new(PlainTextPdf))
}
