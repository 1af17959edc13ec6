//! Attribution files shipped inside every export archive.

use crate::selection::draw_list::Credit;

pub const CSV_HEADER: &str = "filename,notes,authors,licenses,urls";

/// One line per credit under [`CSV_HEADER`]; text fields are quoted.
pub fn credits_to_csv(credits: &[Credit]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for credit in credits {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            credit.file_name,
            quoted(&credit.notes),
            quoted(&credit.authors.join(",")),
            quoted(&credit.licenses.join(",")),
            quoted(&credit.urls.join(",")),
        ));
    }
    out
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Plain-text credits: the file name, then tab-indented note, licenses, authors and links.
pub fn credits_to_txt(credits: &[Credit]) -> String {
    let mut out = String::new();
    for credit in credits {
        out.push_str(&credit.file_name);
        out.push('\n');
        out.push_str(&format!("\t- Note: {}\n", credit.notes));
        out.push_str(&format!("\t{}\n", bullet_list("Licenses", &credit.licenses)));
        out.push_str(&format!("\t{}\n", bullet_list("Authors", &credit.authors)));
        out.push_str(&format!("\t{}\n\n", bullet_list("Links", &credit.urls)));
    }
    out
}

fn bullet_list(title: &str, items: &[String]) -> String {
    format!("- {title}:\n\t\t- {}", items.join("\n\t\t- "))
}

#[cfg(test)]
#[path = "../../tests/unit/export/credits.rs"]
mod tests;
