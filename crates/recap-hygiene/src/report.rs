//! Aggregate hygiene reporting over a session's messages, chunks, and
//! memory.

use crate::patterns::OPTIMAL_CHUNK_CHARS;
use crate::ContextHygiene;
use chrono::{DateTime, Utc};
use recap_core::types::{ContextChunk, Message, SessionMemory};
use serde::{Deserialize, Serialize};

/// Message-level aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub total_messages: usize,
    pub issues_found: usize,
    pub warnings: usize,
    pub sanitized_messages: usize,
}

/// Chunk size distribution summary (characters).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkSizeDistribution {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Chunk-level aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkAnalysis {
    pub total_chunks: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_distribution: Option<ChunkSizeDistribution>,

    /// 100 minus the scaled variance of chunk sizes around the optimum,
    /// floored at zero.
    pub quality_score: f64,
}

/// Memory-level aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryAnalysis {
    pub conflicts: Vec<String>,
    pub constraint_count: usize,
    pub fact_count: usize,
}

/// Full hygiene report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HygieneReport {
    pub generated_at: DateTime<Utc>,
    pub messages: MessageAnalysis,
    pub chunks: ChunkAnalysis,
    pub memory: MemoryAnalysis,
    pub recommendations: Vec<String>,
}

impl ContextHygiene {
    /// Aggregate validation findings, chunk size quality, and memory
    /// conflicts into one report with recommendations.
    pub fn generate_hygiene_report(
        &self,
        messages: &[Message],
        chunks: &[ContextChunk],
        memory: &SessionMemory,
    ) -> HygieneReport {
        let mut message_analysis = MessageAnalysis {
            total_messages: messages.len(),
            ..Default::default()
        };
        for msg in messages {
            let outcome = self.validate_message(&msg.content, msg.role.as_str());
            message_analysis.issues_found += outcome.issues.len();
            message_analysis.warnings += outcome.warnings.len();
            if outcome.sanitized.is_some() {
                message_analysis.sanitized_messages += 1;
            }
        }

        let sizes: Vec<usize> = chunks.iter().map(|c| c.content.chars().count()).collect();
        let (size_distribution, quality_score) = if sizes.is_empty() {
            (None, 0.0)
        } else {
            let min = *sizes.iter().min().unwrap();
            let max = *sizes.iter().max().unwrap();
            let mean = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
            let variance = sizes
                .iter()
                .map(|&size| {
                    let delta = size as f64 - OPTIMAL_CHUNK_CHARS;
                    delta * delta
                })
                .sum::<f64>()
                / sizes.len() as f64;
            (
                Some(ChunkSizeDistribution { min, max, mean }),
                (100.0 - variance / 100.0).max(0.0),
            )
        };

        let conflicts = self.detect_context_conflicts(memory);

        let mut recommendations = Vec::new();
        if message_analysis.issues_found > 0 {
            recommendations.push("Review messages for sensitive information".to_string());
        }
        if quality_score < 70.0 {
            recommendations.push("Optimize context chunk sizes".to_string());
        }
        if !conflicts.is_empty() {
            recommendations.push("Resolve memory conflicts".to_string());
        }
        let sanitized_ratio =
            message_analysis.sanitized_messages as f64 / messages.len().max(1) as f64;
        if sanitized_ratio > 0.1 {
            recommendations
                .push("High sanitization rate - review content policies".to_string());
        }

        HygieneReport {
            generated_at: Utc::now(),
            messages: message_analysis,
            chunks: ChunkAnalysis {
                total_chunks: chunks.len(),
                size_distribution,
                quality_score,
            },
            memory: MemoryAnalysis {
                conflicts,
                constraint_count: memory.constraints_decisions.len(),
                fact_count: memory.canonical_facts.len(),
            },
            recommendations,
        }
    }
}
