//! XML report of the run configuration.
//!
//! The report records every parameter a run was started with under the tag
//! names established by earlier implementations, so existing tooling which
//! greps result directories keeps working. It is write-only provenance; the
//! crate never reads it back.

use std::path::Path;

use itertools::Itertools;
use serde::Serialize;

use crate::cycle::FlagDrivenCycleModel;
use crate::errors::ReportError;
use crate::parameters::{CostMatrix, Demographics};
use crate::selection::ProliferationController;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CostsSection {
    number_of_types: usize,
    row: Vec<String>,
}

/// Serializable snapshot of all run parameters.
///
/// Serializes to an XML fragment with `<ParameterReport>` as root and one
/// element per parameter, for example `<MinCellCycleDuration>` and
/// `<MaxCellCycleDuration>` for the cycle model. Cost matrix and
/// demographics appear under `<Costs>` and `<Demographics>` when attached.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterReport {
    min_cell_cycle_duration: f64,
    max_cell_cycle_duration: f64,
    benefit: f64,
    cost: f64,
    selection_intensity: f64,
    selection_period: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    costs: Option<CostsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    demographics: Option<String>,
}

impl ParameterReport {
    /// Snapshots the cycle model and the selection controller.
    pub fn new(cycle: &FlagDrivenCycleModel, controller: &ProliferationController) -> Self {
        ParameterReport {
            min_cell_cycle_duration: cycle.min_cell_cycle_duration,
            max_cell_cycle_duration: cycle.max_cell_cycle_duration,
            benefit: controller.game.benefit,
            cost: controller.game.cost,
            selection_intensity: controller.game.selection_intensity,
            selection_period: controller.period,
            costs: None,
            demographics: None,
        }
    }

    /// Attaches the cost matrix, one `<Row>` element per matrix row.
    pub fn with_costs(mut self, costs: &CostMatrix) -> Self {
        let matrix = costs.matrix();
        let rows = (0..matrix.nrows())
            .map(|i| (0..matrix.ncols()).map(|j| matrix[(i, j)].to_string()).join(" "))
            .collect();
        self.costs = Some(CostsSection {
            number_of_types: costs.n_types(),
            row: rows,
        });
        self
    }

    /// Attaches the initial demographic proportions.
    pub fn with_demographics(mut self, demographics: &Demographics) -> Self {
        self.demographics = Some(
            demographics
                .proportions()
                .iter()
                .map(|p| p.to_string())
                .join(" "),
        );
        self
    }

    /// Renders the report as an indented XML string.
    pub fn to_xml_string(&self) -> Result<String, ReportError> {
        let mut save_string = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut save_string);
        serializer.indent(' ', 4);
        self.serialize(serializer)
            .map_err(|e| ReportError(format!("{e}")))?;
        Ok(save_string)
    }

    /// Writes the rendered report to a file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml)?;
        Ok(())
    }
}
