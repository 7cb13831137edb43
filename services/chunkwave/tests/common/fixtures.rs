// Sample documents for chunking tests

use chunkwave::core::chunking::ContentType;

/// A sample document and the type it should classify as
#[allow(dead_code)]
pub struct SampleFile {
    pub name: &'static str,
    pub text: String,
    pub content_type: ContentType,
}

/// One sample per content type, each with several natural boundaries
#[allow(dead_code)]
pub fn sample(content_type: ContentType) -> SampleFile {
    let (name, text) = match content_type {
        ContentType::Json => ("records.json", json_records(20)),
        ContentType::Markdown => ("guide.md", markdown_guide(8)),
        ContentType::Log => ("server.log", log_lines(40)),
        ContentType::Code => ("lib.rs", rust_source(10)),
        ContentType::Text => ("essay.txt", paragraphs(12)),
    };
    SampleFile {
        name,
        text,
        content_type,
    }
}

fn json_records(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| format!("  {{\"id\": {i}, \"name\": \"item-{i}\", \"tags\": [\"a\", \"b\"]}}"))
        .collect();
    format!("[\n{}\n]\n", items.join(",\n"))
}

fn markdown_guide(sections: usize) -> String {
    let mut text = String::from("# Guide\n\nIntroductory words about the guide.\n\n");
    for i in 0..sections {
        text.push_str(&format!(
            "## Section {i}\n\nBody text for section {i}, long enough to matter.\n\n"
        ));
    }
    text
}

fn log_lines(n: usize) -> String {
    (0..n)
        .map(|i| {
            format!(
                "[2024-03-01 12:{:02}:{:02}] INFO request {} handled\n",
                i / 60,
                i % 60,
                i
            )
        })
        .collect()
}

fn rust_source(items: usize) -> String {
    let mut text = String::from("use std::collections::HashMap;\n\n");
    for i in 0..items {
        text.push_str(&format!(
            "#[inline]\npub fn handler_{i}(map: &HashMap<u32, u32>) -> u32 {{\n    map.get(&{i}).copied().unwrap_or_default()\n}}\n\n"
        ));
    }
    text
}

fn paragraphs(n: usize) -> String {
    (0..n)
        .map(|i| format!("Paragraph {i} talks about something ordinary.\nIt has two lines.\n\n"))
        .collect()
}
