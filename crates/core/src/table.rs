//! Typed representation of the ledger table.
//!
//! The ledger spreadsheet is the record submitted to the insurer, so its
//! header row is a fixed contract: 45 named columns in a fixed order, some
//! of which carry embedded newlines verbatim from the insurer's template.
//! Rather than passing rows around as string-keyed maps, every column is a
//! [`Column`] variant and a [`Row`] is a fixed-width vector indexed by it.

use registro_types::CellValue;

/// The canonical ledger columns, in canonical order.
///
/// Header strings are reproduced exactly as they appear in the insurer's
/// template, embedded newlines included. Note the two distinct observation
/// columns: [`Column::Observations`] mid-sheet and
/// [`Column::FinalObservations`] at the tail of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DependencyCode,
    Payroll,
    VisitDate,
    BeneficiaryType,
    Cedula,
    PatientName,
    SexGender,
    PatientBirthDate,
    PatientAge,
    ServiceType,
    ItemCode,
    ItemDescription,
    Observations,
    PrimaryDiagnosis,
    SecondaryDiagnosis1,
    SecondaryDiagnosis2,
    Quantity,
    UnitValue,
    ConsultationLength,
    Kinship,
    AffiliateId,
    AffiliateName,
    ReferralCode,
    ReferralSequence,
    CoveredContingency,
    PresumptiveDiagnosis,
    AnesthesiaTime,
    SecondaryDiagnosis3,
    SecondaryDiagnosis4,
    SecondaryDiagnosis5,
    VatPercent,
    VatValue,
    TotalValue,
    ManagementFees,
    AdmissionDate,
    DischargeDate,
    DischargeReason,
    SharedCoverage,
    CoverageType,
    CertifiedDisability,
    BenefitType,
    PhysicianType,
    AuthorizedStartDate,
    FinalObservations,
    FinalMark,
}

impl Column {
    /// Number of canonical columns.
    pub const COUNT: usize = 45;

    /// Every column, in canonical order.
    pub const ALL: [Column; Self::COUNT] = [
        Column::DependencyCode,
        Column::Payroll,
        Column::VisitDate,
        Column::BeneficiaryType,
        Column::Cedula,
        Column::PatientName,
        Column::SexGender,
        Column::PatientBirthDate,
        Column::PatientAge,
        Column::ServiceType,
        Column::ItemCode,
        Column::ItemDescription,
        Column::Observations,
        Column::PrimaryDiagnosis,
        Column::SecondaryDiagnosis1,
        Column::SecondaryDiagnosis2,
        Column::Quantity,
        Column::UnitValue,
        Column::ConsultationLength,
        Column::Kinship,
        Column::AffiliateId,
        Column::AffiliateName,
        Column::ReferralCode,
        Column::ReferralSequence,
        Column::CoveredContingency,
        Column::PresumptiveDiagnosis,
        Column::AnesthesiaTime,
        Column::SecondaryDiagnosis3,
        Column::SecondaryDiagnosis4,
        Column::SecondaryDiagnosis5,
        Column::VatPercent,
        Column::VatValue,
        Column::TotalValue,
        Column::ManagementFees,
        Column::AdmissionDate,
        Column::DischargeDate,
        Column::DischargeReason,
        Column::SharedCoverage,
        Column::CoverageType,
        Column::CertifiedDisability,
        Column::BenefitType,
        Column::PhysicianType,
        Column::AuthorizedStartDate,
        Column::FinalObservations,
        Column::FinalMark,
    ];

    /// The header string for this column, verbatim from the template.
    pub fn header(self) -> &'static str {
        match self {
            Column::DependencyCode => "CÓDIGO DEPENDENCIA\n(ESPECIALIDAD)\n",
            Column::Payroll => "PLANILLA",
            Column::VisitDate => "FECHA ANTENCION",
            Column::BeneficiaryType => "TIPO DE BENEFICIARIO",
            Column::Cedula => "CEDULA",
            Column::PatientName => "NOMBRE DE BENEFICIARIO",
            Column::SexGender => "SEXO-GENERO",
            Column::PatientBirthDate => "FECHA DE NACIMIENTO BENEFICIARIO",
            Column::PatientAge => "EDAD BENEFICIARIO",
            Column::ServiceType => "TIPO DE SERVICIO/ATENCION",
            Column::ItemCode => "CODIGO",
            Column::ItemDescription => "DESCRIPCIÓN",
            Column::Observations => "OBSERVACIONES",
            Column::PrimaryDiagnosis => "DIAGNOSTICO PRINCIPAL CIE-10",
            Column::SecondaryDiagnosis1 => "DIAGNSITICO SECUNDARIO 1",
            Column::SecondaryDiagnosis2 => "DIAGNSITICO SECUNDARIO 2",
            Column::Quantity => "CANTIDAD",
            Column::UnitValue => "VALOR UNITARIO",
            Column::ConsultationLength => "DURACION CONSULTA",
            Column::Kinship => "PARENTESCO",
            Column::AffiliateId => "IDENTIFICACION AFILIADO",
            Column::AffiliateName => "NOMBRE AFIALIADO",
            Column::ReferralCode => "CODIGO DE DERIVACION",
            Column::ReferralSequence => "NUMERO SECUNCIAL DERIVACION",
            Column::CoveredContingency => "CONTINGENCIA CUBIERTA",
            Column::PresumptiveDiagnosis => "DIAGNOSTICO PRESUNTIVO O DIFINITIVO",
            Column::AnesthesiaTime => "TIEMPO ANESTESIA",
            Column::SecondaryDiagnosis3 => "DIAGNSITICO SECUNDARIO 3",
            Column::SecondaryDiagnosis4 => "DIAGNSITICO SECUNDARIO 4",
            Column::SecondaryDiagnosis5 => "DIAGNSITICO SECUNDARIO 5",
            Column::VatPercent => "PORCENTAJE IVA",
            Column::VatValue => "VALOR IVA",
            Column::TotalValue => "VALOR TOTAL",
            Column::ManagementFees => {
                "GASTOS DE GESTIÓN (VALOR\nUNITARIO) / MODIFICADORES NO\nGEOGRÁFICOS (VALOR UNITARIO)"
            }
            Column::AdmissionDate => "FECHA DE INGRESO",
            Column::DischargeDate => "FECHA DE EGRESO",
            Column::DischargeReason => "MOTIVO DE EGRESO",
            Column::SharedCoverage => "COBERTURA COMPARTIDA\n",
            Column::CoverageType => "TIPO DE COBERTURA\n",
            Column::CertifiedDisability => "DISCAPACIDAD CERTIFICADA\n",
            Column::BenefitType => "TIPO DE PRESTACIÓN\n",
            Column::PhysicianType => "TIPO DE MÉDICO",
            Column::AuthorizedStartDate => "FECHA AUTORIZADA PARA INICIO DE ATENCIÓN \n",
            Column::FinalObservations => "OBSERVACIONES\n",
            Column::FinalMark => "MARCA FINAL (SIEMPRE F)",
        }
    }

    /// Positional index of this column in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The up-to-five secondary diagnosis columns, in order.
    pub fn secondary_diagnoses() -> [Column; 5] {
        [
            Column::SecondaryDiagnosis1,
            Column::SecondaryDiagnosis2,
            Column::SecondaryDiagnosis3,
            Column::SecondaryDiagnosis4,
            Column::SecondaryDiagnosis5,
        ]
    }
}

/// One ledger row: exactly [`Column::COUNT`] cells in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    /// A row with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: vec![CellValue::Empty; Column::COUNT],
        }
    }

    /// Builds a row from cells already in canonical order, padding or
    /// truncating to the canonical width.
    pub fn from_cells(mut cells: Vec<CellValue>) -> Self {
        cells.resize(Column::COUNT, CellValue::Empty);
        Self { cells }
    }

    pub fn get(&self, column: Column) -> &CellValue {
        &self.cells[column.index()]
    }

    pub fn set(&mut self, column: Column, value: CellValue) {
        self.cells[column.index()] = value;
    }

    /// Cell content rendered as text (empty string for empty cells).
    pub fn text(&self, column: Column) -> String {
        self.get(column).as_text()
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// The in-memory ledger: an ordered list of schema-conformant rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Splices `new_rows` into the table so the first lands at `position`,
    /// preserving their order. `position` may equal `len()` (append).
    pub fn insert_rows(&mut self, position: usize, new_rows: Vec<Row>) {
        let position = position.min(self.rows.len());
        self.rows.splice(position..position, new_rows);
    }

    /// Removes the rows at the given 0-based positions (positions are
    /// relative to the current ordering, not a stable identity). Unknown
    /// positions are ignored. Returns how many rows were removed.
    pub fn remove_positions(&mut self, positions: &std::collections::BTreeSet<usize>) -> usize {
        let before = self.rows.len();
        let mut index = 0usize;
        self.rows.retain(|_| {
            let keep = !positions.contains(&index);
            index += 1;
            keep
        });
        before - self.rows.len()
    }

    /// Distinct, non-empty patient names in first-seen order.
    pub fn distinct_patients(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            let name = row.text(Column::PatientName);
            if name.trim().is_empty() {
                continue;
            }
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
        out
    }
}
