use super::{percent, Outcome};
use crate::error::ProbeError;
use std::collections::HashMap;

pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// `used/total/NN%` of physical memory, in kB.
pub async fn mem_usage(path: &str) -> Result<Outcome, ProbeError> {
    let info = read_meminfo(path).await?;
    let total = field(&info, "MemTotal")?;
    let available = field(&info, "MemAvailable")?;
    let used = total.saturating_sub(available);
    Ok(Outcome::healthy(format!("{}/{}/{}", used, total, percent(used, total))))
}

/// `used/total/NN%` of swap, in kB.
pub async fn swap_usage(path: &str) -> Result<Outcome, ProbeError> {
    let info = read_meminfo(path).await?;
    let total = field(&info, "SwapTotal")?;
    let free = field(&info, "SwapFree")?;
    let used = total.saturating_sub(free);
    Ok(Outcome::healthy(format!("{}/{}/{}", used, total, percent(used, total))))
}

async fn read_meminfo(path: &str) -> Result<HashMap<String, u64>, ProbeError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_string(),
            source,
        })?;
    Ok(parse_meminfo(&content))
}

/// Parse `Key:   1234 kB` lines; lines that don't fit are ignored.
pub fn parse_meminfo(content: &str) -> HashMap<String, u64> {
    content
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim().to_string(), value))
        })
        .collect()
}

fn field(info: &HashMap<String, u64>, key: &str) -> Result<u64, ProbeError> {
    info.get(key).copied().ok_or_else(|| ProbeError::Parse {
        what: MEMINFO_PATH.to_string(),
        detail: format!("missing {}", key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "MemTotal:       16000000 kB\n\
MemFree:         2000000 kB\n\
MemAvailable:    4000000 kB\n\
SwapTotal:       2000000 kB\n\
SwapFree:        1500000 kB\n\
HugePages_Total:       0\n";

    fn sample_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        file
    }

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(SAMPLE);
        assert_eq!(info["MemTotal"], 16000000);
        assert_eq!(info["HugePages_Total"], 0);
    }

    #[tokio::test]
    async fn test_mem_usage() {
        let file = sample_file();
        let outcome = mem_usage(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(outcome.output, "12000000/16000000/75%");
    }

    #[tokio::test]
    async fn test_swap_usage() {
        let file = sample_file();
        let outcome = swap_usage(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(outcome.output, "500000/2000000/25%");
    }

    #[tokio::test]
    async fn test_missing_field() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "MemTotal: 10 kB").unwrap();
        let err = mem_usage(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("missing MemAvailable"));
    }
}
