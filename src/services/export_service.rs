use crate::error::Result;
use crate::models::report::{JobReportRow, RecruiterRef, ReportColumn, ReportCounts};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    fn recruiter_names(recruiters: &[RecruiterRef]) -> String {
        if recruiters.is_empty() {
            return "—".to_string();
        }
        recruiters
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render the client/job report (every filtered row, not one page) with a
    /// totals row underneath.
    pub fn generate_client_jobs_xlsx(
        rows: &[JobReportRow],
        totals: &ReportCounts,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Client Jobs")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1E293B); // Slate 800
        let header_bg = Color::RGB(0x0F172A); // Slate 900
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC); // Slate 50
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0); // Slate 200
        let client_side = Color::RGB(0xEF4444); // Red
        let mentor_side = Color::RGB(0xF59E0B); // Amber

        // ── Column definitions ──
        let mut columns: Vec<(&str, f64)> = vec![
            ("#", 6.0),
            ("Client", 28.0),
            ("Job", 32.0),
            ("Lead Recruiter", 22.0),
            ("Assigned Recruiters", 34.0),
            ("Positions", 11.0),
            ("Opened", 13.0),
        ];
        let first_count_col = columns.len() as u16;
        for column in ReportColumn::ALL {
            columns.push((column.label(), 13.0));
        }
        let last_col = (columns.len() - 1) as u16;

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        // ── Title rows ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(0, 0, 0, last_col, "Client / Job Report", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(1, 22)?;
        let subtitle_text = format!(
            "Generated: {}  •  Open jobs: {}",
            generated_at.format("%d.%m.%Y %H:%M UTC"),
            rows.len()
        );
        worksheet.merge_range(1, 0, 1, last_col, &subtitle_text, &subtitle_format)?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        worksheet.set_row_height(header_row, 30)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, report_row) in rows.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();

            worksheet.set_row_height(row, 22)?;
            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            worksheet.write_string_with_format(
                row,
                1,
                report_row.client_name.as_deref().unwrap_or("—"),
                &base_fmt,
            )?;
            worksheet.write_string_with_format(row, 2, &report_row.job_title, &base_fmt.clone().set_bold())?;
            let lead = report_row
                .lead_recruiter
                .as_ref()
                .map(|r| r.name.as_str())
                .unwrap_or("—");
            worksheet.write_string_with_format(row, 3, lead, &base_fmt)?;
            worksheet.write_string_with_format(
                row,
                4,
                &Self::recruiter_names(&report_row.assigned_recruiters),
                &wrap_fmt,
            )?;
            worksheet.write_number_with_format(row, 5, report_row.no_of_positions as f64, &center_fmt)?;
            let opened = report_row
                .job_created_at
                .map(|d| d.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| "—".to_string());
            worksheet.write_string_with_format(row, 6, &opened, &center_fmt)?;

            for (offset, column) in ReportColumn::ALL.iter().enumerate() {
                let value = report_row.counts.get(*column);
                let fmt = match column {
                    ReportColumn::RejectedByClient | ReportColumn::DroppedByClient if value > 0 => {
                        center_fmt.clone().set_bold().set_font_color(client_side)
                    }
                    ReportColumn::RejectedByMentor | ReportColumn::DroppedByMentor if value > 0 => {
                        center_fmt.clone().set_bold().set_font_color(mentor_side)
                    }
                    ReportColumn::Total => center_fmt.clone().set_bold(),
                    _ => center_fmt.clone(),
                };
                worksheet.write_number_with_format(row, first_count_col + offset as u16, value as f64, &fmt)?;
            }
        }

        // ── Totals row ──
        let total_row = data_start_row + rows.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF)) // Indigo 100
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        worksheet.set_row_height(total_row, 26)?;
        worksheet.merge_range(
            total_row,
            0,
            total_row,
            first_count_col - 1,
            &format!("Totals across {} jobs", rows.len()),
            &summary_fmt,
        )?;
        for (offset, column) in ReportColumn::ALL.iter().enumerate() {
            worksheet.write_number_with_format(
                total_row,
                first_count_col + offset as u16,
                totals.get(*column) as f64,
                &summary_fmt,
            )?;
        }

        worksheet.set_freeze_panes(3, 0)?;
        worksheet.autofilter(2, 0, (data_start_row + rows.len() as u32).saturating_sub(1).max(2), last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn workbook_is_a_zip_container() {
        let mut counts = ReportCounts::default();
        counts.set(ReportColumn::Total, 3);
        counts.set(ReportColumn::RejectedByClient, 1);
        let row = JobReportRow {
            job_id: Uuid::new_v4(),
            job_title: "Site Reliability Engineer".to_string(),
            client_id: None,
            client_name: Some("Acme".to_string()),
            lead_recruiter: Some(RecruiterRef {
                id: Uuid::new_v4(),
                name: "Lena".to_string(),
            }),
            assigned_recruiters: Vec::new(),
            no_of_positions: 2,
            job_created_at: Some(Utc::now()),
            counts: counts.clone(),
        };

        let buffer = ExportService::generate_client_jobs_xlsx(&[row], &counts, Utc::now()).unwrap();
        assert!(buffer.starts_with(b"PK"));

        let empty = ExportService::generate_client_jobs_xlsx(&[], &ReportCounts::default(), Utc::now()).unwrap();
        assert!(!empty.is_empty());
    }
}
