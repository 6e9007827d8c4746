//! Survey wizard view

use super::components::{render_button, BUTTON_HEIGHT};
use super::forms::{draw_field, draw_field_with_value};
use super::render_scrollable_list;
use crate::app::App;
use crate::session::{exclusion_rows, ExclusionRow, WizardSession};
use crate::state::{required_technical_fields, Form, RelatedRecord, StepKind, SurveyType};
use crate::workflow::SubmitPhase;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the wizard for the open session
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let banner_height = if session.load_errors.is_empty() {
        0
    } else {
        2 + session.load_errors.len() as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Breadcrumb
            Constraint::Length(banner_height), // Load errors
            Constraint::Min(0),                // Step body
            Constraint::Length(1),             // Hint
        ])
        .split(area);

    draw_breadcrumb(frame, chunks[0], session);
    if !session.load_errors.is_empty() {
        super::draw_banner(frame, chunks[1], &session.load_errors.join("\n"));
    }

    let body = chunks[2];
    match session.wizard.current_kind() {
        StepKind::Review => draw_review(frame, body, session),
        StepKind::Input | StepKind::TechnicalView => draw_inputs(frame, body, session),
        StepKind::Exclusions => draw_exclusions(frame, body, session),
        StepKind::Estimation => draw_estimation(frame, body, session),
        StepKind::Documents => draw_documents(frame, body, session),
        StepKind::Submit => draw_submit(frame, body, session),
    }

    if let Some(hint) = &session.hint {
        let hint = Paragraph::new(Span::styled(
            format!(" {hint}"),
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(hint, chunks[3]);
    }
}

fn draw_breadcrumb(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let wizard = &session.wizard;
    let mut spans = vec![];
    for (idx, title) in wizard.step_titles().iter().enumerate() {
        let step = idx + 1;
        if idx > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        }
        let style = if step == wizard.current_step() {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if step < wizard.current_step() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("F{step} {title}"), style));
    }

    let mut title = format!(
        " {} · {} · step {}/{} ",
        session.bundle.survey.display_name(),
        wizard.survey_type().label(),
        wizard.current_step(),
        wizard.total_steps()
    );
    if session.is_read_only() {
        title.push_str("· read-only ");
    }
    let breadcrumb = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(breadcrumb, area);
}

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<18}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn draw_review(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let survey = &session.bundle.survey;
    let dash = || "-".to_string();

    let mut lines = vec![
        label_value("Survey", survey.display_name()),
        label_value("Type", survey.survey_type.label().to_string()),
        label_value("State", survey.state_label().to_string()),
        label_value("Customer", survey.partner_name.clone().unwrap_or_else(dash)),
        Line::from(""),
    ];

    match &session.bundle.related {
        RelatedRecord::Opportunity(opportunity) => {
            lines.push(label_value(
                "Opportunity",
                opportunity.name.clone().unwrap_or_else(dash),
            ));
            let vehicle = [&opportunity.vehicle_make, &opportunity.vehicle_model]
                .iter()
                .filter_map(|part| part.as_deref())
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(label_value(
                "Vehicle",
                if vehicle.is_empty() { dash() } else { vehicle },
            ));
            lines.push(label_value(
                "Plate",
                opportunity.plate_number.clone().unwrap_or_else(dash),
            ));
        }
        RelatedRecord::Claim(claim) => {
            lines.push(label_value("Claim", claim.name.clone().unwrap_or_else(dash)));
            lines.push(label_value(
                "Claimant",
                claim.partner_name.clone().unwrap_or_else(dash),
            ));
            lines.push(label_value(
                "Estimation",
                match session.lines.estimation_id() {
                    Some(id) => format!("#{id} ({} lines)", session.lines.len()),
                    None => dash(),
                },
            ));
        }
        RelatedRecord::None => {
            lines.push(Line::from(Span::styled(
                "No linked opportunity or claim",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let review = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Review ").borders(Borders::ALL));
    frame.render_widget(review, area);
}

fn draw_inputs(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let fields = session.wizard.input_fields(session.wizard.current_kind());
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|field| {
            if field.is_multiline() {
                Constraint::Min(5)
            } else {
                Constraint::Length(3)
            }
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let focused = session.focused_field();
    for (field, chunk) in fields.iter().zip(chunks.iter()) {
        let mut label = field.label().to_string();
        if session.wizard.current_kind() == StepKind::TechnicalView
            && required_technical_fields(session.wizard.survey_type()).contains(field)
        {
            label.push_str(" *");
        }
        draw_field_with_value(
            frame,
            *chunk,
            &label,
            session.wizard.draft().field(*field),
            focused == Some(*field),
            field.is_multiline(),
        );
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn draw_exclusions(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let block = Block::default()
        .title(" Exclusions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let categories = &session.bundle.exclusion_categories;
    if categories.is_empty() {
        let empty = Paragraph::new("No exclusion categories available.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let selection = &session.wizard.draft().exclusions;
    let items: Vec<ListItem> = exclusion_rows(categories)
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let cursor_style = if idx == session.cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let line = match row {
                ExclusionRow::Category(index) => {
                    let category = &categories[index];
                    let selected = selection.is_category_selected(&category.name);
                    let incomplete = selection
                        .incomplete_categories()
                        .contains(&category.name.as_str());
                    Line::from(vec![
                        Span::styled(checkbox(selected), cursor_style),
                        Span::raw(" "),
                        Span::styled(
                            category.name.clone(),
                            cursor_style.add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            if incomplete { "  pick a type" } else { "" },
                            Style::default().fg(Color::Yellow),
                        ),
                    ])
                }
                ExclusionRow::Type { category, kind } => {
                    let category = &categories[category];
                    let kind = &category.types[kind];
                    Line::from(vec![
                        Span::raw("    "),
                        Span::styled(
                            checkbox(selection.is_type_selected(&category.name, &kind.code)),
                            cursor_style,
                        ),
                        Span::raw(" "),
                        Span::styled(kind.label.clone(), cursor_style),
                    ])
                }
            };
            ListItem::new(line)
        })
        .collect();

    render_scrollable_list(frame, area, List::new(items).block(block), session.cursor);
}

fn draw_estimation(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Lines
            Constraint::Length(1), // Item type
            Constraint::Length(3), // Description
            Constraint::Length(3), // Amounts
        ])
        .split(area);

    let title = format!(" Estimation lines · total {:.2} ", session.lines.total());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let item_types = &session.bundle.item_types;
    let items: Vec<ListItem> = session
        .lines
        .items()
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let style = if idx == session.cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let type_name = line
                .item_type_id
                .and_then(|id| item_types.iter().find(|t| t.id == id))
                .map(|t| t.name.as_str())
                .unwrap_or("-");
            let marker = if line.is_new() { "+" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::styled(format!(" {type_name:<12}"), Style::default().fg(Color::Magenta)),
                Span::styled(format!(" {:<24}", line.description), style),
                Span::styled(
                    format!(
                        " {:>6} × {:>10.2} − {:>8.2} = {:>10.2}",
                        line.quantity, line.unit_amount, line.depreciation, line.amount
                    ),
                    style,
                ),
            ]))
        })
        .collect();
    render_scrollable_list(frame, chunks[0], List::new(items).block(block), session.cursor);

    let form = &session.line_form;
    let type_label = form
        .selected_item_type(item_types)
        .map(|t| t.name.as_str())
        .unwrap_or("(no item types)");
    let mut type_spans = vec![
        Span::styled(" Item type: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("◂ {type_label} ▸"), Style::default().fg(Color::Cyan)),
    ];
    if form.editing.is_some() {
        type_spans.push(Span::styled(
            "  editing selected line, Enter saves",
            Style::default().fg(Color::Yellow),
        ));
    }
    let type_line = Paragraph::new(Line::from(type_spans));
    frame.render_widget(type_line, chunks[1]);

    if let Some(description) = form.get_field(0) {
        draw_field(frame, chunks[2], description, form.active_field() == 0);
    }

    let amount_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[3]);
    for (offset, chunk) in amount_chunks.iter().enumerate() {
        let index = offset + 1;
        if let Some(field) = form.get_field(index) {
            draw_field(frame, *chunk, field, form.active_field() == index);
        }
    }
}

fn draw_documents(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let draft = session.wizard.draft();
    let highlight = |idx: usize| {
        if idx == session.cursor && !session.path_focused {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        }
    };

    let mut items: Vec<ListItem> = draft
        .document_slots
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            ListItem::new(Line::from(vec![
                Span::styled(checkbox(slot.received), highlight(idx)),
                Span::raw(" "),
                Span::styled(slot.name.clone(), highlight(idx)),
            ]))
        })
        .collect();

    let slot_count = draft.document_slots.len();
    items.extend(draft.photos.iter().enumerate().map(|(offset, photo)| {
        let idx = slot_count + offset;
        ListItem::new(Line::from(vec![
            Span::styled("📷 ", highlight(idx)),
            Span::styled(photo.name.clone(), highlight(idx)),
            Span::styled(
                format!("  {}", photo.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
    }));

    let title = format!(" Documents · {} photo(s) ", draft.photos.len());
    let border = if session.path_focused {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    render_scrollable_list(frame, chunks[0], list, session.cursor);

    draw_field(frame, chunks[1], &session.photo_path, session.path_focused);
}

fn draw_submit(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let draft = session.wizard.draft();
    let phase = session.orchestrator.phase();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(BUTTON_HEIGHT)])
        .split(area);

    let mut lines = vec![
        label_value("Conclusion", draft.conclusion.clone()),
        label_value("Recommendation", draft.recommendation.clone()),
    ];
    match session.wizard.survey_type() {
        SurveyType::Issuance => {
            lines.push(label_value("Condition", draft.vehicle_condition.clone()));
            lines.push(label_value("Market value", draft.market_value.clone()));
            lines.push(label_value(
                "Exclusions",
                draft.exclusions.emit().len().to_string(),
            ));
        }
        SurveyType::Claim => {
            lines.push(label_value("Damage", draft.damage_description.clone()));
            lines.push(label_value("Repair cost", draft.estimated_repair_cost.clone()));
            let partition = session.lines.partition();
            lines.push(label_value(
                "Lines",
                format!(
                    "{} new, {} existing",
                    partition.new_items.len(),
                    partition.existing_items.len()
                ),
            ));
        }
        SurveyType::Generic(_) => {}
    }
    lines.push(label_value(
        "Documents",
        format!(
            "{}/{} received, {} photo(s)",
            draft.document_slots.iter().filter(|s| s.received).count(),
            draft.document_slots.len(),
            draft.photos.len()
        ),
    ));
    lines.push(Line::from(""));

    let phase_color = match phase {
        SubmitPhase::Idle => Color::Gray,
        SubmitPhase::Submitting => Color::Yellow,
        SubmitPhase::Succeeded => Color::Green,
        SubmitPhase::Failed(_) => Color::Red,
    };
    lines.push(Line::from(Span::styled(
        phase.label().to_string(),
        Style::default().fg(phase_color),
    )));
    if let SubmitPhase::Failed(reason) = phase {
        lines.push(Line::from(Span::styled(
            reason.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let summary = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Submit ").borders(Borders::ALL));
    frame.render_widget(summary, chunks[0]);

    let button_area = Rect {
        width: chunks[1].width.min(24),
        ..chunks[1]
    };
    let label = match phase {
        SubmitPhase::Failed(_) => "Retry submit",
        _ => "Submit survey",
    };
    render_button(
        frame,
        button_area,
        label,
        true,
        session.orchestrator.can_submit(),
    );
}
