#![allow(dead_code)]

use std::{collections::VecDeque, io};

use async_trait::async_trait;
use hashbrown::HashMap;

use quizdrill::{
    core::store::QuizStore,
    quiz::QuizDraft,
    runtime::handle::{QuizStoreHandle, RuntimeConfig, spawn_quiz_store},
    session::{LineSurface, Report},
};

/// Replays canned lines and records everything the engine does with it.
#[derive(Default)]
pub struct ScriptedSurface {
    pub inputs: VecDeque<String>,
    pub prompts: Vec<String>,
    pub prefills: Vec<String>,
    pub reports: Vec<Report>,
    pub ready_count: usize,
}

impl ScriptedSurface {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Error(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl LineSurface for ScriptedSurface {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn prefill(&mut self, text: &str) {
        self.prefills.push(text.to_string());
    }

    fn report(&mut self, report: Report) {
        self.reports.push(report);
    }

    fn ready(&mut self) {
        self.ready_count += 1;
    }
}

/// Answers every question from a lookup table, optionally botching the n-th one (1-based).
pub struct OracleSurface {
    pub answers: HashMap<String, String>,
    pub wrong_at: Option<usize>,
    pub asked: Vec<String>,
    pub reports: Vec<Report>,
}

impl OracleSurface {
    pub fn new(pairs: &[(&str, &str)], wrong_at: Option<usize>) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            wrong_at,
            asked: Vec::new(),
            reports: Vec::new(),
        }
    }
}

#[async_trait]
impl LineSurface for OracleSurface {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.asked.push(prompt.to_string());
        if self.wrong_at == Some(self.asked.len()) {
            return Ok(Some("definitely not it".to_string()));
        }
        // Mangle case and padding to exercise answer normalization.
        Ok(self
            .answers
            .get(prompt)
            .map(|a| format!("  {}  ", a.to_uppercase())))
    }

    fn report(&mut self, report: Report) {
        self.reports.push(report);
    }
}

pub async fn store_with(pairs: &[(&str, &str)]) -> QuizStoreHandle {
    let handle = spawn_quiz_store(QuizStore::new(), None, RuntimeConfig::default());
    for (q, a) in pairs {
        handle.create(QuizDraft::new(*q, *a)).await.expect("seed quiz");
    }
    handle
}
