//! Standalone HTML artifact: every frame as a styled `<pre>`, cycled by an
//! inline script. No external assets.

use std::fmt::Write as _;

use super::Recording;
use crate::canvas::Grid;
use crate::types::{Cell, Style};

const SCRIPT: &str = r#"
(function () {
  var frames = document.querySelectorAll('pre.frame');
  var label = document.getElementById('counter');
  var toggle = document.getElementById('toggle');
  var interval = parseInt(document.body.dataset.interval, 10);
  var current = 0, timer = null;
  function show(i) {
    frames[current].hidden = true;
    current = i;
    frames[current].hidden = false;
    label.textContent = 'Frame ' + (current + 1) + '/' + frames.length;
  }
  function stop() { clearInterval(timer); timer = null; toggle.textContent = 'Play'; }
  function play() {
    if (current === frames.length - 1) { show(0); }
    toggle.textContent = 'Pause';
    timer = setInterval(function () {
      if (current + 1 >= frames.length) { stop(); return; }
      show(current + 1);
    }, interval);
  }
  toggle.onclick = function () { timer ? stop() : play(); };
  document.getElementById('restart').onclick = function () { stop(); show(0); play(); };
  show(0);
  play();
})();
"#;

fn escape(ch: char, out: &mut String) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        c => out.push(c),
    }
}

fn css(style: &Style) -> String {
    let mut css = String::new();
    if let Some(fg) = &style.fg {
        let _ = write!(css, "color:{};", fg.css());
    }
    if let Some(bg) = &style.bg {
        let _ = write!(css, "background:{};", bg.css());
    }
    if style.bold {
        css.push_str("font-weight:bold;");
    }
    if style.dim {
        css.push_str("opacity:.55;");
    }
    css
}

/// One grid row as HTML, merging runs of equally styled cells into a span.
fn row_html(row: &[Cell], out: &mut String) {
    let mut i = 0;
    while i < row.len() {
        let style = row[i].style;
        let run_end = row[i..]
            .iter()
            .position(|c| c.style != style)
            .map_or(row.len(), |n| i + n);
        let styled = !style.is_default();
        if styled {
            let _ = write!(out, "<span style=\"{}\">", css(&style));
        }
        for cell in &row[i..run_end] {
            escape(cell.ch, out);
        }
        if styled {
            out.push_str("</span>");
        }
        i = run_end;
    }
}

fn frame_html(index: usize, grid: &Grid, out: &mut String) {
    let _ = write!(out, "<pre class=\"frame\" id=\"frame-{index}\" hidden>");
    for row in grid.rows() {
        row_html(row, out);
        out.push('\n');
    }
    out.push_str("</pre>\n");
}

pub fn page(recording: &Recording) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Chase replay</title>\n<style>\n");
    out.push_str("body{background:#111;color:#ddd;font-family:monospace}\n");
    out.push_str("pre{line-height:1.1;margin:0}\nbutton{margin:.5em .5em .5em 0}\n");
    out.push_str("</style>\n</head>\n");
    let _ = writeln!(out, "<body data-interval=\"{}\">", recording.interval_ms);
    out.push_str("<div><button id=\"toggle\">Pause</button><button id=\"restart\">Restart</button>");
    out.push_str("<span id=\"counter\"></span></div>\n");

    for (index, grid) in recording.frames.iter().enumerate() {
        frame_html(index, grid, &mut out);
    }

    if !recording.markers.is_empty() {
        out.push_str("<ul class=\"markers\">\n");
        for marker in &recording.markers {
            let mut label = String::new();
            marker.label.chars().for_each(|c| escape(c, &mut label));
            let _ = writeln!(out, "<li>frame {}: {label}</li>", marker.frame_index + 1);
        }
        out.push_str("</ul>\n");
    }

    let _ = writeln!(out, "<script>{SCRIPT}</script>");
    out.push_str("</body>\n</html>\n");
    out
}
