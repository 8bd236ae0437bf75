// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Parser;

use super::common::{read_catalog_file, InfoPrinter};
use crate::{calibrators::CalibratorCatalog, CalpipeError};

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct CalibratorsArgs {
    /// A toml or json calibrator catalogue to list alongside the built-in
    /// MeerKAT calibrators.
    #[clap(long, parse(from_os_str))]
    catalog: Option<PathBuf>,
}

impl CalibratorsArgs {
    pub(super) fn run(self) -> Result<(), CalpipeError> {
        let catalog = match &self.catalog {
            Some(file) => read_catalog_file(file)?,
            None => CalibratorCatalog::meerkat(),
        };

        let mut printer = InfoPrinter::new(format!("{} flux calibrators", catalog.len()).into());
        let width = catalog.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        printer.push_block(
            catalog
                .iter()
                .map(|(name, standard)| format!("{name:width$}  {standard}").into())
                .collect(),
        );
        printer.display();
        Ok(())
    }
}
