// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Pretty printers for reporting information.
use std::{borrow::Cow, sync::Mutex};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNING_PRINTER: Mutex<Blocks> = Mutex::new(Blocks::default());
}

/// Lines of text grouped into blocks. The first line of each block gets a
/// branch symbol; the rest are indented under it.
#[derive(Default)]
struct Blocks(Vec<Vec<Cow<'static, str>>>);

impl Blocks {
    fn lines(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        let num_blocks = self.0.len();
        self.0.iter().enumerate().flat_map(move |(i_block, block)| {
            let num_lines = block.len();
            block.iter().enumerate().map(move |(i_line, line)| {
                let symbol = match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
                    (0, false, _) => VERTICAL_AND_RIGHT,
                    (0, _, false) => VERTICAL_AND_RIGHT,
                    (0, true, true) => UP_AND_RIGHT,
                    _ => VERTICAL,
                };
                (symbol, line.as_ref())
            })
        })
    }
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Blocks,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: Blocks::default(),
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.0.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.0.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(&self.title).bold());
        for (symbol, line) in self.blocks.lines() {
            log::info!("{symbol} {line}");
        }
        log::info!("");
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().0.push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().0.push(vec![self.into()]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().0.push(self);
    }
}

/// Print out any warnings that have been collected as CLI arguments have been
/// parsed. This should only be called once before all arguments have been
/// parsed into parameters.
pub(crate) fn display_warnings() {
    let mut printer = WARNING_PRINTER.lock().unwrap();
    log::debug!("Displaying warnings");
    if printer.0.is_empty() {
        return;
    }

    log::warn!("{}", console::style("Warnings").bold());
    for (symbol, line) in printer.lines() {
        log::warn!("{symbol} {line}");
    }
    log::warn!("");
    printer.0.clear();
}
