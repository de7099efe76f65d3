use std::io::Write;

use crossterm::{cursor, queue, style, terminal};

use crate::config::KeyBindings;

/// Print a menu item string, bolding any text inside `[...]` brackets.
/// Text outside brackets is printed dim.
pub fn print_menu_item<W: Write>(out: &mut W, item: &str) -> anyhow::Result<()> {
    let mut rest = item;
    while !rest.is_empty() {
        if let Some(open) = rest.find('[') {
            if open > 0 {
                queue!(
                    out,
                    style::SetAttribute(style::Attribute::Dim),
                    style::Print(&rest[..open]),
                    style::SetAttribute(style::Attribute::Reset),
                )?;
            }
            rest = &rest[open..];
            if let Some(close) = rest.find(']') {
                queue!(
                    out,
                    style::SetAttribute(style::Attribute::Bold),
                    style::Print(&rest[..=close]),
                    style::SetAttribute(style::Attribute::Reset),
                )?;
                rest = &rest[close + 1..];
            } else {
                queue!(out, style::Print(rest))?;
                break;
            }
        } else {
            queue!(
                out,
                style::SetAttribute(style::Attribute::Dim),
                style::Print(rest),
                style::SetAttribute(style::Attribute::Reset),
            )?;
            break;
        }
    }
    Ok(())
}

/// Menu entries for the configured bindings.
pub fn menu_items(keys: &KeyBindings) -> Vec<String> {
    vec![
        format!("[{}] pause/resume", keys.pause),
        format!("[{}] restart", keys.restart),
        format!("[{}][{}] step", keys.step_back, keys.step_forward),
        format!("[{}][Esc] quit", keys.quit),
    ]
}

/// Draw the menu bar on the first terminal row.
pub fn render_menubar<W: Write>(out: &mut W, keys: &KeyBindings) -> anyhow::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, item) in menu_items(keys).iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        print_menu_item(out, item)?;
    }
    out.flush()?;
    Ok(())
}

/// Draw a dim status line at row `y`, clearing what was there.
pub fn render_status<W: Write>(out: &mut W, y: u16, text: &str) -> anyhow::Result<()> {
    let mut cs = style::ContentStyle::default();
    cs.attributes.set(style::Attribute::Dim);
    queue!(
        out,
        cursor::MoveTo(0, y),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::PrintStyledContent(style::StyledContent::new(cs, text)),
    )?;
    out.flush()?;
    Ok(())
}
