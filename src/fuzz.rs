// src/fuzz.rs - Randomized operation driver checked against a reference model
//
// Every step generates one operation, applies it to both the gap buffer and a
// plain `Vec<char>` model, and compares the results. Argument ranges reach
// past the ends of the text (1.5x the current byte count) so clamping at the
// start and end of the buffer is exercised constantly.

use crate::buffer::GapBuffer;
use crate::config::FuzzConfig;
use crate::error::GapBufferError;
use log::{debug, info, trace};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("could not set up buffer: {0}")]
    Setup(#[from] GapBufferError),
    #[error("invalid operation weights: {0}")]
    Weights(#[from] WeightedError),
    #[error("step {step} ({op}): {detail}")]
    Divergence {
        step: u64,
        op: String,
        detail: String,
    },
}

/// Operation kinds, in the order of [`OpWeights::as_array`](crate::config::OpWeights::as_array).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    InsertBytes,
    InsertText,
    MoveAbsolute,
    MoveRelative,
    RemoveForwards,
    RemoveBackwards,
    IterateLines,
}

impl OpKind {
    pub const ALL: [OpKind; 7] = [
        OpKind::InsertBytes,
        OpKind::InsertText,
        OpKind::MoveAbsolute,
        OpKind::MoveRelative,
        OpKind::RemoveForwards,
        OpKind::RemoveBackwards,
        OpKind::IterateLines,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuzzOp {
    Insert(Vec<u8>),
    MoveAbsolute(usize),
    MoveRelative(isize),
    RemoveForwards(usize),
    RemoveBackwards(usize),
    IterateLines,
}

impl fmt::Display for FuzzOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuzzOp::Insert(bytes) => write!(
                f,
                "INSERT {} {:?}",
                bytes.len(),
                String::from_utf8_lossy(bytes)
            ),
            FuzzOp::MoveAbsolute(index) => write!(f, "MOVE_ABSOLUTE {index}"),
            FuzzOp::MoveRelative(offset) => write!(f, "MOVE_RELATIVE {offset}"),
            FuzzOp::RemoveForwards(count) => write!(f, "REMOVE_FORWARDS {count}"),
            FuzzOp::RemoveBackwards(count) => write!(f, "REMOVE_BACKWARDS {count}"),
            FuzzOp::IterateLines => write!(f, "PRINT"),
        }
    }
}

/// Straightforward model of the buffer: a vector of codepoints and a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceModel {
    chars: Vec<char>,
    cursor: usize,
}

impl ReferenceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepts(bytes: &[u8]) -> bool {
        std::str::from_utf8(bytes).is_ok()
    }

    /// Inserts `bytes` at the cursor if they are valid UTF-8.
    pub fn insert(&mut self, bytes: &[u8]) -> bool {
        let Ok(text) = std::str::from_utf8(bytes) else {
            return false;
        };
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(self.cursor..self.cursor, inserted);
        self.cursor += count;
        true
    }

    pub fn move_absolute(&mut self, index: usize) -> usize {
        self.cursor = index.min(self.chars.len());
        self.cursor
    }

    pub fn move_relative(&mut self, offset: isize) -> usize {
        let moved = if offset < 0 {
            offset.unsigned_abs().min(self.cursor)
        } else {
            offset.unsigned_abs().min(self.chars.len() - self.cursor)
        };
        if offset < 0 {
            self.cursor -= moved;
        } else {
            self.cursor += moved;
        }
        moved
    }

    pub fn remove_forwards(&mut self, count: usize) -> usize {
        let removed = count.min(self.chars.len() - self.cursor);
        self.chars.drain(self.cursor..self.cursor + removed);
        removed
    }

    pub fn remove_backwards(&mut self, count: usize) -> usize {
        let removed = count.min(self.cursor);
        self.chars.drain(self.cursor - removed..self.cursor);
        self.cursor -= removed;
        removed
    }

    pub fn before(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    pub fn after(&self) -> String {
        self.chars[self.cursor..].iter().collect()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn byte_len(&self) -> usize {
        self.chars.iter().map(|c| c.len_utf8()).sum()
    }

    /// Lines as the buffer's iterator reports them: split on `\n`, with no
    /// empty line after a trailing newline.
    pub fn lines(&self) -> Vec<String> {
        let text = self.text();
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }
}

/// Applies `op` to both the buffer and the model and compares what each
/// reports. Returns whether an insert was accepted; other operations
/// always return `true`.
pub fn apply_op(
    buffer: &mut GapBuffer<'_>,
    model: &mut ReferenceModel,
    op: &FuzzOp,
) -> Result<bool, String> {
    match op {
        FuzzOp::Insert(bytes) => match buffer.insert(bytes) {
            Ok(()) => {
                if model.insert(bytes) {
                    Ok(true)
                } else {
                    Err("buffer accepted malformed UTF-8".to_string())
                }
            }
            Err(GapBufferError::InvalidUtf8 { .. }) => {
                if ReferenceModel::accepts(bytes) {
                    Err("buffer rejected well-formed UTF-8".to_string())
                } else {
                    Ok(false)
                }
            }
            Err(GapBufferError::NotResizable { .. }) if !buffer.is_resizable() => Ok(false),
            Err(err) => Err(format!("insert failed: {err}")),
        },
        FuzzOp::MoveAbsolute(index) => {
            expect_same("landed on", buffer.move_absolute(*index), model.move_absolute(*index))
        }
        FuzzOp::MoveRelative(offset) => {
            expect_same("moved", buffer.move_relative(*offset), model.move_relative(*offset))
        }
        FuzzOp::RemoveForwards(count) => expect_same(
            "removed",
            buffer.remove_forwards(*count),
            model.remove_forwards(*count),
        ),
        FuzzOp::RemoveBackwards(count) => expect_same(
            "removed",
            buffer.remove_backwards(*count),
            model.remove_backwards(*count),
        ),
        FuzzOp::IterateLines => {
            let mut lines = Vec::new();
            let mut iter = buffer.lines();
            while let Some(line) = iter.next_line() {
                lines.push(line.as_str().to_string());
            }
            let expected = model.lines();
            if lines == expected {
                Ok(true)
            } else {
                Err(format!("lines {lines:?}, expected {expected:?}"))
            }
        }
    }
}

fn expect_same(what: &str, actual: usize, expected: usize) -> Result<bool, String> {
    if actual == expected {
        Ok(true)
    } else {
        Err(format!("{what} {actual} codepoints, expected {expected}"))
    }
}

/// Checks the buffer's internal invariants and that it holds exactly the
/// model's text with the cursor in the same place.
pub fn verify(buffer: &GapBuffer<'_>, model: &ReferenceModel) -> Result<(), String> {
    buffer.check_invariants().map_err(|err| err.to_string())?;
    if buffer.byte_count() != model.byte_len() {
        return Err(format!(
            "byte count {}, expected {}",
            buffer.byte_count(),
            model.byte_len()
        ));
    }
    let before = model.before();
    if buffer.text_before_cursor() != before {
        return Err(format!(
            "text before cursor {:?}, expected {:?}",
            buffer.text_before_cursor(),
            before
        ));
    }
    let after = model.after();
    if buffer.text_after_cursor() != after {
        return Err(format!(
            "text after cursor {:?}, expected {:?}",
            buffer.text_after_cursor(),
            after
        ));
    }
    Ok(())
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzReport {
    pub seed: u64,
    pub steps: u64,
    pub counts: [u64; 7],
    pub inserts_accepted: u64,
    pub inserts_rejected: u64,
    pub relocations: u64,
    pub final_bytes: usize,
    pub final_capacity: usize,
}

impl fmt::Display for FuzzReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {}: {} steps", self.seed, self.steps)?;
        for (kind, count) in OpKind::ALL.iter().zip(self.counts) {
            writeln!(f, "  {kind:?}: {count}")?;
        }
        writeln!(
            f,
            "  inserts accepted {} / rejected {}",
            self.inserts_accepted, self.inserts_rejected
        )?;
        write!(
            f,
            "  relocations {}, final {} bytes in {} capacity",
            self.relocations, self.final_bytes, self.final_capacity
        )
    }
}

pub struct Fuzzer {
    config: FuzzConfig,
    seed: u64,
    rng: StdRng,
    weights: WeightedIndex<u32>,
}

impl Fuzzer {
    pub fn new(config: FuzzConfig) -> Result<Self, FuzzError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let weights = WeightedIndex::new(config.weights.as_array())?;
        Ok(Self {
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
            weights,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws the next operation for a buffer currently holding `byte_count` bytes.
    pub fn next_op(&mut self, byte_count: usize) -> (OpKind, FuzzOp) {
        let kind = OpKind::ALL[self.weights.sample(&mut self.rng)];
        let limit = byte_count + byte_count / 2;
        let op = match kind {
            OpKind::InsertBytes => FuzzOp::Insert(self.random_bytes()),
            OpKind::InsertText => FuzzOp::Insert(self.random_text().into_bytes()),
            OpKind::MoveAbsolute => FuzzOp::MoveAbsolute(self.rng.gen_range(0..=limit)),
            OpKind::MoveRelative => {
                let limit = isize::try_from(limit).unwrap_or(isize::MAX);
                FuzzOp::MoveRelative(self.rng.gen_range(-limit..=limit))
            }
            OpKind::RemoveForwards => FuzzOp::RemoveForwards(self.rng.gen_range(0..=limit)),
            OpKind::RemoveBackwards => FuzzOp::RemoveBackwards(self.rng.gen_range(0..=limit)),
            OpKind::IterateLines => FuzzOp::IterateLines,
        };
        (kind, op)
    }

    /// Arbitrary bytes, usually not valid UTF-8.
    fn random_bytes(&mut self) -> Vec<u8> {
        let len = self.rng.gen_range(0..=self.config.max_insert_len);
        let mut bytes = vec![0u8; len];
        self.rng.fill(bytes.as_mut_slice());
        bytes
    }

    /// Well-formed text mixing 1- to 4-byte codepoints and the odd newline.
    fn random_text(&mut self) -> String {
        let max = self.config.max_insert_len;
        let mut text = String::new();
        if max == 0 {
            return text;
        }
        let target = self.rng.gen_range(1..=max);
        while text.len() < target {
            let width = self.rng.gen_range(1..=(target - text.len()).min(4));
            let range = match width {
                1 => 0x00..=0x7F,
                2 => 0x80..=0x7FF,
                3 => 0x800..=0xFFFF,
                _ => 0x1_0000..=0x10_FFFF,
            };
            // Surrogates are redrawn.
            if let Some(ch) = char::from_u32(self.rng.gen_range(range)) {
                text.push(ch);
            }
        }
        text
    }

    /// Runs the configured number of steps against a fresh buffer.
    pub fn run(&mut self) -> Result<FuzzReport, FuzzError> {
        info!(
            "fuzzing {} steps with seed {} ({})",
            self.config.iterations,
            self.seed,
            match self.config.fixed_region {
                Some(len) => format!("fixed region of {len} bytes"),
                None => format!("growable, initial capacity {}", self.config.initial_capacity),
            }
        );
        match self.config.fixed_region {
            Some(len) => {
                let mut region = vec![0u8; len];
                let mut buffer = GapBuffer::from_region(&mut region)?;
                self.drive(&mut buffer)
            }
            None => {
                let mut buffer = GapBuffer::with_capacity(self.config.initial_capacity)?;
                self.drive(&mut buffer)
            }
        }
    }

    fn drive(&mut self, buffer: &mut GapBuffer<'_>) -> Result<FuzzReport, FuzzError> {
        let mut model = ReferenceModel::new();
        let mut report = FuzzReport {
            seed: self.seed,
            ..FuzzReport::default()
        };

        for step in 0..self.config.iterations {
            let (kind, op) = self.next_op(buffer.byte_count());
            let capacity = buffer.capacity();

            let divergence = |detail: String| FuzzError::Divergence {
                step,
                op: op.to_string(),
                detail,
            };

            let accepted = apply_op(buffer, &mut model, &op).map_err(divergence)?;
            if let FuzzOp::Insert(_) = op {
                trace!("{} .. {}", op, if accepted { "DONE" } else { "NOT DONE" });
                if accepted {
                    report.inserts_accepted += 1;
                } else {
                    report.inserts_rejected += 1;
                }
            } else {
                trace!("{}", op);
            }

            if buffer.capacity() != capacity {
                debug!("step {}: capacity {} -> {}", step, capacity, buffer.capacity());
                report.relocations += 1;
            }
            if self.config.check_invariants {
                verify(buffer, &model).map_err(divergence)?;
            }

            report.counts[kind as usize] += 1;
            report.steps += 1;
        }

        report.final_bytes = buffer.byte_count();
        report.final_capacity = buffer.capacity();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpWeights;
    use crate::region::HEADER_LEN;

    fn config(seed: u64, iterations: u64) -> FuzzConfig {
        FuzzConfig {
            seed: Some(seed),
            iterations,
            ..FuzzConfig::default()
        }
    }

    #[test]
    fn test_model_clamps_like_buffer() {
        let mut model = ReferenceModel::new();
        assert!(model.insert("héllo".as_bytes()));
        assert_eq!(model.move_relative(-10), 5);
        assert_eq!(model.move_relative(2), 2);
        assert_eq!(model.remove_backwards(9), 2);
        assert_eq!(model.remove_forwards(9), 3);
        assert_eq!(model.text(), "");
    }

    #[test]
    fn test_model_rejects_invalid() {
        let mut model = ReferenceModel::new();
        assert!(!model.insert(&[0x80]));
        assert_eq!(model.byte_len(), 0);
    }

    #[test]
    fn test_model_lines() {
        let mut model = ReferenceModel::new();
        assert!(model.lines().is_empty());
        model.insert(b"ab\n\ncd\n");
        assert_eq!(model.lines(), vec!["ab", "", "cd"]);
    }

    #[test]
    fn test_op_display() {
        assert_eq!(FuzzOp::MoveRelative(-3).to_string(), "MOVE_RELATIVE -3");
        assert_eq!(FuzzOp::Insert(b"ab".to_vec()).to_string(), "INSERT 2 \"ab\"");
        assert_eq!(FuzzOp::IterateLines.to_string(), "PRINT");
    }

    #[test]
    fn test_random_text_is_valid_and_bounded() {
        let mut fuzzer = Fuzzer::new(config(3, 0)).unwrap();
        for _ in 0..200 {
            let text = fuzzer.random_text();
            assert!(!text.is_empty());
            assert!(text.len() <= 32);
        }
    }

    #[test]
    fn test_same_seed_same_ops() {
        let mut a = Fuzzer::new(config(11, 0)).unwrap();
        let mut b = Fuzzer::new(config(11, 0)).unwrap();
        for size in 0..50 {
            assert_eq!(a.next_op(size), b.next_op(size));
        }
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = config(1, 1);
        config.weights = OpWeights {
            insert_bytes: 0,
            insert_text: 0,
            move_absolute: 0,
            move_relative: 0,
            remove_forwards: 0,
            remove_backwards: 0,
            iterate_lines: 0,
        };
        assert!(matches!(Fuzzer::new(config), Err(FuzzError::Weights(_))));
    }

    #[test]
    fn test_growable_run() {
        let report = Fuzzer::new(config(42, 3_000)).unwrap().run().unwrap();
        assert_eq!(report.steps, 3_000);
        assert_eq!(report.counts.iter().sum::<u64>(), 3_000);
        assert!(report.inserts_accepted > 0);
        assert!(report.inserts_rejected > 0);
        assert!(report.relocations > 0);
    }

    #[test]
    fn test_fixed_region_run() {
        let mut config = config(7, 3_000);
        config.fixed_region = Some(HEADER_LEN + 64);
        let report = Fuzzer::new(config).unwrap().run().unwrap();
        assert_eq!(report.relocations, 0);
        assert_eq!(report.final_capacity, 64);
    }

    #[test]
    fn test_fixed_region_too_small() {
        let mut config = config(7, 1);
        config.fixed_region = Some(HEADER_LEN - 1);
        assert!(matches!(
            Fuzzer::new(config).unwrap().run(),
            Err(FuzzError::Setup(GapBufferError::TooSmall { .. }))
        ));
    }
}
