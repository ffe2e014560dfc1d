// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Chart-ready tables out to CSV or JSON.

use crate::error::{ExportError, ExportResult};
use serde::Serialize;
use std::io::Write;

/// Write rows as CSV with a header row taken from the row's field names.
/// An empty slice writes nothing.
pub fn write_csv<W: Write, T: Serialize>(rows: &[T], writer: W) -> ExportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn to_csv_string<T: Serialize>(rows: &[T]) -> ExportResult<String> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> ExportResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
