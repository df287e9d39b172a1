//! Tables inside graphic frames.

use super::shape::{fill_of, line_style};
use super::text::extract_text;
use super::ParseContext;
use crate::normalize::NormalizedElement;
use crate::theme::{resolve_hex, ThemeContext};
use crate::xml::XmlNode;
use ppt_core::components::{CellStyle, Fill, TableCell, TableData};
use ppt_core::rich_text::{RichParagraph, RichTable, RichTableCell, RichTableRow, RichTextBlock, RichTextRun};
use ppt_core::units::{emu_to_pixels, font_size_to_points};
use ppt_core::{ComponentData, PowerPointComponent, Result, RichTextDocument};

pub fn parse_table(element: &NormalizedElement, ctx: &ParseContext<'_>) -> Result<Option<PowerPointComponent>> {
    let Some(tbl) = element.node.find(&["graphic", "graphicData", "tbl"]) else {
        return Ok(None);
    };

    let column_widths: Vec<i64> = tbl
        .child("tblGrid")
        .map(|grid| {
            grid.children_named("gridCol")
                .map(|col| emu_to_pixels(col.attr_i64_lenient("w").unwrap_or(0)))
                .collect()
        })
        .unwrap_or_default();
    let rows: Vec<&XmlNode> = tbl.children_named("tr").collect();
    let row_heights: Vec<i64> = rows
        .iter()
        .map(|tr| emu_to_pixels(tr.attr_i64_lenient("h").unwrap_or(0)))
        .collect();

    let geometry = ctx.geometry(element);
    let total_width = if element.transform.is_some() { geometry.width } else { column_widths.iter().sum() };
    let total_height = if element.transform.is_some() { geometry.height } else { row_heights.iter().sum() };
    if rows.is_empty() || total_width <= 0 || total_height <= 0 {
        log::debug!("Table {:?} has no rows or no size", element.name());
        return Ok(None);
    }

    let has_header_row = tbl
        .child("tblPr")
        .and_then(|p| p.attr_bool("firstRow"))
        .unwrap_or(false);
    let grid_width = column_widths
        .len()
        .max(rows.iter().map(|tr| tr.children_named("tc").count()).max().unwrap_or(0));

    let mut cells = Vec::with_capacity(rows.len());
    for (row_index, tr) in rows.iter().enumerate() {
        let is_header = has_header_row && row_index == 0;
        cells.push(parse_row(tr, row_index, grid_width, is_header, ctx.theme));
    }

    let rich_text = rich_table(&cells);
    let content = rich_text.plain_text();
    let data = TableData {
        rows: rows.len(),
        columns: grid_width,
        column_widths,
        row_heights,
        cells,
        has_header_row,
        rich_text,
    };

    Ok(Some(ctx.component(element, ComponentData::Table(data)).with_content(content)))
}

/// One row, padded so it always has `grid_width` cells. Cells covered by a
/// `gridSpan` that the source omits are synthesized as continuations.
fn parse_row(tr: &XmlNode, row: usize, grid_width: usize, is_header: bool, theme: &ThemeContext) -> Vec<TableCell> {
    let mut out: Vec<TableCell> = Vec::with_capacity(grid_width);
    let mut pending_span = 0u32;

    for tc in tr.children_named("tc") {
        let h_merge = tc.attr_bool("hMerge").unwrap_or(false);
        if pending_span > 0 {
            if h_merge {
                pending_span -= 1;
            } else {
                while pending_span > 0 && out.len() < grid_width {
                    out.push(continuation(row, out.len(), is_header));
                    pending_span -= 1;
                }
            }
        }
        if out.len() >= grid_width {
            log::debug!("Row {} has more cells than the grid is wide", row);
            break;
        }
        let cell = parse_cell(tc, row, out.len(), is_header, theme);
        pending_span = cell.col_span.saturating_sub(1);
        out.push(cell);
    }
    while pending_span > 0 && out.len() < grid_width {
        out.push(continuation(row, out.len(), is_header));
        pending_span -= 1;
    }
    while out.len() < grid_width {
        let mut empty = continuation(row, out.len(), is_header);
        empty.is_merge_continuation = false;
        out.push(empty);
    }
    out
}

fn continuation(row: usize, column: usize, is_header: bool) -> TableCell {
    TableCell {
        text: String::new(),
        row,
        column,
        row_span: 1,
        col_span: 1,
        is_merged: false,
        is_merge_continuation: true,
        is_header,
        style: None,
    }
}

fn parse_cell(tc: &XmlNode, row: usize, column: usize, is_header: bool, theme: &ThemeContext) -> TableCell {
    let col_span = tc.attr_u32_lenient("gridSpan").unwrap_or(1).max(1);
    let row_span = tc.attr_u32_lenient("rowSpan").unwrap_or(1).max(1);
    let continuation = tc.attr_bool("hMerge").unwrap_or(false) || tc.attr_bool("vMerge").unwrap_or(false);

    let text = tc.child("txBody").map(|body| extract_text(body, &[], theme, None));
    let tc_pr = tc.child("tcPr");

    let mut style = CellStyle::default();
    if let Some(tc_pr) = tc_pr {
        style.fill_color = fill_of(tc_pr, theme).as_ref().and_then(Fill::primary_color).map(str::to_string);
        style.vertical_align = tc_pr.attr("anchor").map(|a| {
            match a {
                "t" => "top",
                "ctr" => "middle",
                "b" => "bottom",
                other => other,
            }
            .to_string()
        });
        style.border_left = line_style(tc_pr.child("lnL"), None, theme);
        style.border_right = line_style(tc_pr.child("lnR"), None, theme);
        style.border_top = line_style(tc_pr.child("lnT"), None, theme);
        style.border_bottom = line_style(tc_pr.child("lnB"), None, theme);
    }
    if let Some(body) = tc.child("txBody") {
        // Only explicit run formatting belongs to the cell; defaults come from
        // the table style, which is not resolved.
        if let Some(r_pr) = body.descendant("rPr") {
            style.font_size = r_pr.attr("sz").map(|sz| font_size_to_points(Some(sz)));
            style.bold = r_pr.attr_bool("b");
            style.italic = r_pr.attr_bool("i");
            style.font_family = r_pr
                .child("latin")
                .and_then(|l| l.attr("typeface"))
                .and_then(|t| theme.resolve_typeface(t));
            style.text_color = resolve_hex(r_pr.child("solidFill"), theme);
        }
    }
    if let Some(text) = &text {
        style.text_align = text.style.text_align.clone();
    }

    TableCell {
        text: text.map(|t| t.content).unwrap_or_default(),
        row,
        column,
        row_span,
        col_span,
        is_merged: col_span > 1 || row_span > 1,
        is_merge_continuation: continuation,
        is_header,
        style: (!style.is_empty()).then_some(style),
    }
}

/// Full-grid rich-text rendition; merge continuations are folded into the
/// spanning cell.
fn rich_table(cells: &[Vec<TableCell>]) -> RichTextDocument {
    let rows = cells
        .iter()
        .map(|row| RichTableRow {
            is_header: row.first().is_some_and(|c| c.is_header),
            cells: row
                .iter()
                .filter(|c| !c.is_merge_continuation)
                .map(|c| RichTableCell {
                    col_span: c.col_span,
                    row_span: c.row_span,
                    blocks: c
                        .text
                        .lines()
                        .filter(|l| !l.is_empty())
                        .map(|line| {
                            RichTextBlock::Paragraph(RichParagraph {
                                runs: vec![RichTextRun::plain(line)],
                                ..Default::default()
                            })
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    RichTextDocument::new(vec![RichTextBlock::Table(RichTable { rows })])
}
