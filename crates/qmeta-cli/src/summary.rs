use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qmeta_model::{ParticipantRole, Provenance, QuestionInfo};

use crate::types::{CatalogReport, MapReport, RulesReport, ScoreReport};

pub fn print_map_report(report: &MapReport) {
    print_header(&report.project, &report.fingerprint);
    if let Some(path) = &report.exported {
        println!("Mapping: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Questionnaire"),
        header_cell("Display name"),
        header_cell("Rows"),
        header_cell("Forms"),
        header_cell("Companion"),
        header_cell("Both"),
        header_cell("Imputed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_rows = 0usize;
    let mut total_imputed = 0usize;
    for summary in &report.questionnaires {
        total_rows += summary.rows;
        total_imputed += summary.imputed;
        let display = if summary.display_questionnaire == summary.questionnaire {
            dim_cell("-")
        } else {
            Cell::new(&summary.display_questionnaire)
        };
        table.add_row(vec![
            name_cell(&summary.questionnaire),
            display,
            Cell::new(summary.rows),
            Cell::new(summary.forms),
            Cell::new(summary.companion),
            Cell::new(summary.both),
            count_cell(summary.imputed, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(format!("{} questionnaires", report.questionnaires.len())),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(total_imputed, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_messages("Warnings", report.warnings.iter());
}

pub fn print_catalog_report(report: &CatalogReport) {
    print_header(&report.project, &report.fingerprint);
    if let Some((questionnaire, questions)) = &report.questions {
        println!("Questionnaire: {questionnaire}");
        print_question_table(questions);
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Questionnaire"),
            header_cell("Form"),
            header_cell("Role"),
            header_cell("Items"),
            header_cell("Scorable"),
            header_cell("Excluded"),
            header_cell("Timestamps"),
            header_cell("Forms"),
            header_cell("Companion"),
            header_cell("Both"),
            header_cell("Scoring"),
        ]);
        apply_summary_table_style(&mut table);
        for index in 3..10 {
            align_column(&mut table, index, CellAlignment::Right);
        }
        align_column(&mut table, 10, CellAlignment::Center);
        for summary in &report.questionnaires {
            table.add_row(vec![
                name_cell(&summary.questionnaire),
                optional_cell(summary.alternate_name.as_deref()),
                optional_cell(summary.participant_role.as_ref().map(ParticipantRole::as_str)),
                Cell::new(summary.items),
                Cell::new(summary.scorable_items),
                count_cell(summary.excluded_items, Color::Yellow),
                Cell::new(summary.timestamp_items),
                Cell::new(summary.forms_items),
                Cell::new(summary.companion_items),
                Cell::new(summary.both_items),
                flag_cell(summary.has_scoring),
            ]);
        }
        println!("{table}");
    }

    let mut types = Table::new();
    types.set_header(vec![header_cell("Type"), header_cell("Questions")]);
    apply_table_style(&mut types);
    align_column(&mut types, 1, CellAlignment::Right);
    for (question_type, count) in &report.type_counts {
        types.add_row(vec![Cell::new(question_type.as_str()), Cell::new(count)]);
    }
    println!();
    println!("{types}");
    print_messages("Discrepancies", report.discrepancies.iter());
    if !report.unmatched_mapping.is_empty() {
        println!();
        println!(
            "Mapping columns without a dictionary entry: {}",
            report.unmatched_mapping.join(", ")
        );
    }
}

fn print_question_table(questions: &[QuestionInfo]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Type"),
        header_cell("Text"),
        header_cell("Choices"),
        header_cell("Source"),
        header_cell("Flags"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for question in questions {
        let mut flags = Vec::new();
        if question.is_timestamp {
            flags.push("timestamp");
        }
        if question.excluded_from_scoring {
            flags.push("excluded");
        }
        if question.ancestor.is_some() {
            flags.push("indicator");
        }
        table.add_row(vec![
            Cell::new(&question.variable_name),
            Cell::new(question.question_type.as_str()),
            Cell::new(&question.text),
            match question.choice_set() {
                Some(choices) => Cell::new(choices.len()),
                None => dim_cell("-"),
            },
            optional_cell(question.provenance.as_ref().map(Provenance::as_str)),
            if flags.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(flags.join(", ")).fg(Color::Yellow)
            },
        ]);
    }
    println!("{table}");
}

pub fn print_rules_report(report: &RulesReport) {
    print_header(&report.project, &report.fingerprint);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Questionnaire"),
        header_cell("Method"),
        header_cell("Columns"),
        header_cell("Reversed"),
        header_cell("Clusters"),
        header_cell("Range"),
        header_cell("Notes"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for info in &report.descriptors {
        let range = match info.range() {
            Some((min, max)) => Cell::new(format!("{min}-{max}")),
            None => dim_cell("-"),
        };
        let mut notes = Vec::new();
        if !info.method().is_computable() {
            notes.push("not computable");
        }
        if info.need_clarification() {
            notes.push("needs clarification");
        }
        if info.require_step_adjustment() {
            notes.push("step adjustment");
        }
        let method = if info.method().is_computable() {
            Cell::new(info.method().as_str())
        } else {
            dim_cell(info.method().as_str())
        };
        table.add_row(vec![
            name_cell(info.questionnaire()),
            method,
            Cell::new(info.columns().len()),
            count_cell(info.reversed_columns().len(), Color::Magenta),
            Cell::new(info.clusters().len()),
            range,
            if notes.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(notes.join(", ")).fg(Color::Yellow)
            },
        ]);
    }
    println!("{table}");
    print_messages("Warnings", report.warnings.iter());
    if !report.rejected.is_empty() {
        eprintln!("Rejected rules:");
        for rejected in &report.rejected {
            eprintln!("- {}: {}", rejected.questionnaire, rejected.error);
        }
    }
}

pub fn print_score_report(report: &ScoreReport) {
    println!("Project: {}", report.project);
    println!("Responses: {} ({} rows)", report.responses.display(), report.rows);
    if let Some(path) = &report.output {
        println!("Output: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Questionnaire"),
        header_cell("Column"),
        header_cell("Scored"),
        header_cell("Missing"),
        header_cell("Mean"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for column in &report.columns {
        table.add_row(vec![
            name_cell(&column.questionnaire),
            Cell::new(&column.column),
            Cell::new(column.scored),
            count_cell(column.missing, Color::Yellow),
            number_cell(column.mean),
            number_cell(column.min),
            number_cell(column.max),
        ]);
    }
    println!("{table}");
    if !report.skipped.is_empty() {
        let mut skipped = Table::new();
        skipped.set_header(vec![header_cell("Skipped"), header_cell("Reason")]);
        apply_table_style(&mut skipped);
        for (questionnaire, reason) in &report.skipped {
            skipped.add_row(vec![Cell::new(questionnaire), dim_cell(reason)]);
        }
        println!();
        println!("{skipped}");
    }
}

fn print_header(project: &str, fingerprint: &str) {
    println!("Project: {project}");
    println!("Inputs: {fingerprint}");
}

fn print_messages<T: std::fmt::Display>(title: &str, messages: impl ExactSizeIterator<Item = T>) {
    if messages.len() == 0 {
        return;
    }
    println!();
    println!("{title}:");
    for message in messages {
        println!("- {message}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn total_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn name_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn flag_cell(flag: bool) -> Cell {
    if flag {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn number_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.2}")),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
