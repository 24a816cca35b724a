use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{error::Result, id::NodeId, node::Content, tree::Tree};

/// Render the tree as an indented, colored listing of names, flags and
/// arranged rects. This is a debug function.
pub fn dump(tree: &Tree) -> Result<String> {
    dump_into(tree, Buffer::ansi())
}

/// Like [`dump`], without color codes.
pub fn dump_plain(tree: &Tree) -> Result<String> {
    dump_into(tree, Buffer::no_color())
}

/// Write the listing into a buffer and return it as a string.
fn dump_into(tree: &Tree, mut buffer: Buffer) -> Result<String> {
    dump_node(&mut buffer, tree, tree.root(), 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Write a flag marker in a highlight color.
fn write_flag(buffer: &mut Buffer, flag: &str) -> Result<()> {
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    write!(buffer, " ({flag})")?;
    buffer.reset()?;
    Ok(())
}

/// Dump one node and recurse.
fn dump_node(buffer: &mut Buffer, tree: &Tree, id: NodeId, level: usize) -> Result<()> {
    let node = tree.node(id)?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.name())?;
    buffer.reset()?;
    for (on, flag) in [
        (!node.is_visible(), "hidden"),
        (!node.is_enabled(), "disabled"),
        (node.is_focused(), "focused"),
        (node.is_pressed(), "pressed"),
    ] {
        if on {
            write_flag(buffer, flag)?;
        }
    }
    writeln!(buffer)?;

    let r = node.rect();
    write_field(
        buffer,
        &indent,
        "rect:",
        &format!("x: {}, y: {}, w: {}, h: {}", r.tl.x, r.tl.y, r.w, r.h),
    )?;
    let d = node.desired();
    write_field(buffer, &indent, "desired:", &format!("{} × {}", d.w, d.h))?;
    if !node.children().is_empty() {
        write_field(buffer, &indent, "policy:", node.policy.name())?;
    }
    match node.content_ref() {
        Content::Empty => {}
        Content::Fixed(s) => write_field(buffer, &indent, "fixed:", &format!("{} × {}", s.w, s.h))?,
        Content::Text(t) => write_field(buffer, &indent, "text:", &format!("{t:?}"))?,
        Content::Image(i) => write_field(buffer, &indent, "image:", &i.name)?,
        Content::SizeOf(src) => {
            let name = tree
                .get(*src)
                .map_or_else(|| "<gone>".to_string(), |n| n.name().to_string());
            write_field(buffer, &indent, "size of:", &name)?;
        }
    }

    for child in node.children() {
        dump_node(buffer, tree, *child, level + 1)?;
    }
    Ok(())
}
