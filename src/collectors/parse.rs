//! Positional decoding of `/proc` text records.
//!
//! All parsers return `None` on short or unparsable input. The caller skips
//! the entity for that snapshot.

use crate::types::{CpuSample, Derived, TaskSample, TaskState};

/// Number of counters read from a `cpuN` line.
const CPU_COUNTERS: usize = 7;

// Zero-based field positions in a `stat` record, after name normalization.
const FIELD_PID: usize = 0;
const FIELD_NAME: usize = 1;
const FIELD_STATE: usize = 2;
const FIELD_PPID: usize = 3;
const FIELD_UTIME: usize = 13;
const FIELD_STIME: usize = 14;
const FIELD_PROCESSOR: usize = 38;
const FIELD_BLKIO_TICKS: usize = 41;

/// Parses one per-core line of `/proc/stat` (`cpu0 user nice system ...`).
///
/// The aggregate `cpu ` line has no core index and is rejected.
#[must_use]
pub fn parse_cpu_line(line: &str) -> Option<CpuSample> {
    let mut fields = line.split_whitespace();
    let core = fields.next()?.strip_prefix("cpu")?.parse::<usize>().ok()?;

    let mut counters = [0u64; CPU_COUNTERS];
    for slot in &mut counters {
        *slot = fields.next()?.parse().ok()?;
    }
    let [user, nice, system, idle, iowait, irq, softirq] = counters;

    Some(CpuSample { core, user, nice, system, idle, iowait, irq, softirq, decay: None })
}

/// Replaces spaces inside the parenthesized name with `_`.
///
/// The name runs from the first `(` to the last `)`, so names that contain
/// spaces or parentheses themselves stay a single field.
fn normalize_name(record: &str) -> Option<String> {
    let open = record.find('(')?;
    let close = record.rfind(')')?;
    if close < open {
        return None;
    }

    let mut normalized = String::with_capacity(record.len());
    normalized.push_str(&record[..open]);
    normalized.push_str(&record[open..=close].replace([' ', '\t'], "_"));
    normalized.push_str(&record[close + 1..]);
    Some(normalized)
}

/// Parses a process `stat` record.
///
/// `parent` is set to the parent pid from the record.
#[must_use]
pub fn parse_task_stat(record: &str) -> Option<TaskSample> {
    let normalized = normalize_name(record.trim_end())?;
    let fields: Vec<&str> = normalized.split_whitespace().collect();
    if fields.len() <= FIELD_PROCESSOR {
        return None;
    }

    let state = fields[FIELD_STATE].chars().next().map_or(TaskState::Unknown, TaskState::from_char);

    Some(TaskSample {
        id: fields[FIELD_PID].parse().ok()?,
        parent: fields[FIELD_PPID].parse().ok()?,
        name: fields[FIELD_NAME].to_string(),
        state,
        processor: fields[FIELD_PROCESSOR].parse().ok()?,
        utime: fields[FIELD_UTIME].parse().ok()?,
        stime: fields[FIELD_STIME].parse().ok()?,
        blkio_ticks: fields.get(FIELD_BLKIO_TICKS).and_then(|s| s.parse().ok()),
        derived: Derived::default(),
    })
}

/// Parses a thread `stat` record owned by `pid`.
#[must_use]
pub fn parse_thread_stat(pid: u32, record: &str) -> Option<TaskSample> {
    parse_task_stat(record).map(|task| TaskSample { parent: pid, ..task })
}

/// Turns a raw command line into a display name.
///
/// Argument separators and other control characters become spaces (tabs are
/// kept). Returns `None` for an empty result, as kernel threads have no
/// command line.
#[must_use]
pub fn clean_display_name(raw: &str) -> Option<String> {
    let cleaned: String =
        raw.chars().map(|c| if (c as u32) > 31 || c == '\t' { c } else { ' ' }).collect();
    let trimmed = cleaned.trim_end();
    if trimmed.trim_start().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat_record(name: &str) -> String {
        let mut fields: Vec<String> = vec!["913".into(), format!("({name})"), "S".into(), "1".into()];
        fields.extend((4..52).map(|i| match i {
            13 => "1200".to_string(),
            14 => "300".to_string(),
            38 => "5".to_string(),
            41 => "17".to_string(),
            _ => "0".to_string(),
        }));
        fields.join(" ")
    }

    #[test]
    fn test_parse_cpu_line() {
        let sample = parse_cpu_line("cpu3 10 1 5 85 2 0 7 0 0 0").unwrap();
        assert_eq!(sample.core, 3);
        assert_eq!(sample.user, 10);
        assert_eq!(sample.nice, 1);
        assert_eq!(sample.system, 5);
        assert_eq!(sample.idle, 85);
        assert_eq!(sample.iowait, 2);
        assert_eq!(sample.irq, 0);
        assert_eq!(sample.softirq, 7);
        assert_eq!(sample.clock(), 110);
    }

    #[test]
    fn test_parse_cpu_line_rejects_aggregate_and_short() {
        assert!(parse_cpu_line("cpu  10 1 5 85 2 0 7").is_none());
        assert!(parse_cpu_line("cpu0 10 1 5").is_none());
        assert!(parse_cpu_line("intr 12345").is_none());
        assert!(parse_cpu_line("cpu0 10 x 5 85 2 0 7").is_none());
    }

    #[test]
    fn test_parse_task_stat_fields() {
        let task = parse_task_stat(&stat_record("kvm")).unwrap();
        assert_eq!(task.id, 913);
        assert_eq!(task.parent, 1);
        assert_eq!(task.name, "(kvm)");
        assert_eq!(task.state, TaskState::Sleeping);
        assert_eq!(task.utime, 1200);
        assert_eq!(task.stime, 300);
        assert_eq!(task.processor, 5);
        assert_eq!(task.blkio_ticks, Some(17));
        assert_eq!(task.derived, Derived::default());
    }

    #[test]
    fn test_parse_task_stat_name_with_spaces_keeps_alignment() {
        let task = parse_task_stat(&stat_record("Web Content (x)")).unwrap();
        assert_eq!(task.name, "(Web_Content_(x))");
        assert_eq!(task.utime, 1200);
        assert_eq!(task.processor, 5);
    }

    #[test]
    fn test_parse_task_stat_without_blkio() {
        let record: Vec<String> = stat_record("sh").split(' ').take(40).map(String::from).collect();
        let task = parse_task_stat(&record.join(" ")).unwrap();
        assert_eq!(task.blkio_ticks, None);
    }

    #[test]
    fn test_parse_task_stat_rejects_short_record() {
        assert!(parse_task_stat("913 (kvm) S 1 0 0").is_none());
        assert!(parse_task_stat("").is_none());
        assert!(parse_task_stat("913 kvm S 1").is_none());
    }

    #[test]
    fn test_parse_thread_stat_sets_owner() {
        let thread = parse_thread_stat(7154, &stat_record("kvm")).unwrap();
        assert_eq!(thread.parent, 7154);
        assert_eq!(thread.id, 913);
    }

    #[test]
    fn test_clean_display_name() {
        assert_eq!(
            clean_display_name("/usr/bin/kvm\0-smbios\0").as_deref(),
            Some("/usr/bin/kvm -smbios")
        );
        assert_eq!(clean_display_name("a\tb").as_deref(), Some("a\tb"));
        assert_eq!(clean_display_name(""), None);
        assert_eq!(clean_display_name("\0\0"), None);
    }
}
