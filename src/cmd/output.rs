use anyhow::Result;

use streamseek::StreamDescriptor;

pub fn print_json(streams: &[StreamDescriptor]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(streams)?);
    Ok(())
}

pub fn print_table(streams: &[StreamDescriptor], headers: bool) {
    if streams.is_empty() {
        eprintln!("No streams found");
        return;
    }

    for (i, stream) in streams.iter().enumerate() {
        println!("{:>3}. {}  ({})", i + 1, stream.name, stream.size);
        println!("     {}", truncate_text(&stream.title, 80));
        println!("     {}", stream.url);
        if headers {
            for (name, value) in &stream.headers {
                println!("       {name}: {value}");
            }
        }
    }
    println!("\n({} streams)", streams.len());
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_text("Dexter • S01E05", 80), "Dexter • S01E05");
        assert_eq!(truncate_text("Dexter • S01E05", 8), "Dexter …");
    }
}
