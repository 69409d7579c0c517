//! Run context
//!
//! A [`RunContext`] holds everything one export run shares between its
//! workers: the detail table writers, the dimension tables, the clinician
//! roster and the formatting rules. It is constructed once at run start and
//! passed by reference (usually inside an `Arc`) to every worker.

use super::tables::{self, TableSpec};
use crate::core::format::{CdwFormatter, RecordFormatter};
use crate::core::keys::{DedupTable, KeySpace};
use crate::core::output::{clean, DetailTableWriter};
use crate::domain::{CdwError, Result, SurrogateKey};
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Number of clinicians in the staff roster
pub const CLINICIANS: usize = 100;

/// Natural key of the "Once per day." dosage row
pub const DEFAULT_DOSAGE_KEY: &str = "default dosage";

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Writers for every detail table
#[derive(Debug)]
pub struct DetailTables {
    pub lookuppatient: DetailTableWriter,
    pub spatient: DetailTableWriter,
    pub spatientaddress: DetailTableWriter,
    pub spatientphone: DetailTableWriter,
    pub patientrace: DetailTableWriter,
    pub patientethnicity: DetailTableWriter,
    pub consult: DetailTableWriter,
    pub visit: DetailTableWriter,
    pub appointment: DetailTableWriter,
    pub inpatient: DetailTableWriter,
    pub immunization: DetailTableWriter,
    pub allergy: DetailTableWriter,
    pub allergicreaction: DetailTableWriter,
    pub allergycomment: DetailTableWriter,
    pub problemlist: DetailTableWriter,
    pub vdiagnosis: DetailTableWriter,
    pub rxoutpatient: DetailTableWriter,
    pub rxoutpatfill: DetailTableWriter,
    pub nonvamed: DetailTableWriter,
    pub cprsorder: DetailTableWriter,
    pub ordereditem: DetailTableWriter,
    pub observation: DetailTableWriter,
    pub procedure: DetailTableWriter,
    pub careplan: DetailTableWriter,
    pub imagingstudy: DetailTableWriter,
}

impl DetailTables {
    fn build<E>(
        mut open: impl FnMut(&TableSpec) -> std::result::Result<DetailTableWriter, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            lookuppatient: open(&tables::LOOKUP_PATIENT)?,
            spatient: open(&tables::SPATIENT)?,
            spatientaddress: open(&tables::SPATIENT_ADDRESS)?,
            spatientphone: open(&tables::SPATIENT_PHONE)?,
            patientrace: open(&tables::PATIENT_RACE)?,
            patientethnicity: open(&tables::PATIENT_ETHNICITY)?,
            consult: open(&tables::CONSULT)?,
            visit: open(&tables::VISIT)?,
            appointment: open(&tables::APPOINTMENT)?,
            inpatient: open(&tables::INPATIENT)?,
            immunization: open(&tables::IMMUNIZATION)?,
            allergy: open(&tables::ALLERGY)?,
            allergicreaction: open(&tables::ALLERGIC_REACTION)?,
            allergycomment: open(&tables::ALLERGY_COMMENT)?,
            problemlist: open(&tables::PROBLEM_LIST)?,
            vdiagnosis: open(&tables::VDIAGNOSIS)?,
            rxoutpatient: open(&tables::RX_OUTPATIENT)?,
            rxoutpatfill: open(&tables::RX_OUTPAT_FILL)?,
            nonvamed: open(&tables::NON_VA_MED)?,
            cprsorder: open(&tables::CPRS_ORDER)?,
            ordereditem: open(&tables::ORDERED_ITEM)?,
            observation: open(&tables::OBSERVATION)?,
            procedure: open(&tables::PROCEDURE)?,
            careplan: open(&tables::CARE_PLAN)?,
            imagingstudy: open(&tables::IMAGING_STUDY)?,
        })
    }

    /// Every writer, in catalogue order
    pub fn all(&self) -> [&DetailTableWriter; 25] {
        [
            &self.lookuppatient,
            &self.spatient,
            &self.spatientaddress,
            &self.spatientphone,
            &self.patientrace,
            &self.patientethnicity,
            &self.consult,
            &self.visit,
            &self.appointment,
            &self.inpatient,
            &self.immunization,
            &self.allergy,
            &self.allergicreaction,
            &self.allergycomment,
            &self.problemlist,
            &self.vdiagnosis,
            &self.rxoutpatient,
            &self.rxoutpatfill,
            &self.nonvamed,
            &self.cprsorder,
            &self.ordereditem,
            &self.observation,
            &self.procedure,
            &self.careplan,
            &self.imagingstudy,
        ]
    }

    /// Flushes every writer
    pub fn flush_all(&self) -> Result<()> {
        for writer in self.all() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flushes and closes every writer
    pub fn close_all(&self) -> Result<()> {
        for writer in self.all() {
            writer.close()?;
        }
        Ok(())
    }
}

/// Deduplicating tables for every dimension
#[derive(Debug)]
pub struct DimensionTables {
    pub sstaff: DedupTable,
    pub maritalstatus: DedupTable,
    pub sta3n: DedupTable,
    pub location: DedupTable,
    pub immunizationname: DedupTable,
    pub reaction: DedupTable,
    pub providernarrative: DedupTable,
    pub localdrug: DedupTable,
    pub nationaldrug: DedupTable,
    pub dosageform: DedupTable,
    pub pharmacyorderableitem: DedupTable,
    pub orderableitem: DedupTable,
    pub orderstatus: DedupTable,
    pub vistapackage: DedupTable,
}

impl DimensionTables {
    fn new(key_start: u64) -> Self {
        let table = |spec: &TableSpec| DedupTable::new(spec.name, key_start).with_header(spec.header);
        Self {
            sstaff: table(&tables::SSTAFF),
            maritalstatus: table(&tables::MARITAL_STATUS),
            sta3n: table(&tables::STA3N),
            location: table(&tables::LOCATION),
            immunizationname: table(&tables::IMMUNIZATION_NAME),
            reaction: table(&tables::REACTION),
            providernarrative: table(&tables::PROVIDER_NARRATIVE),
            localdrug: table(&tables::LOCAL_DRUG),
            nationaldrug: table(&tables::NATIONAL_DRUG),
            dosageform: table(&tables::DOSAGE_FORM),
            pharmacyorderableitem: table(&tables::PHARMACY_ORDERABLE_ITEM),
            orderableitem: table(&tables::ORDERABLE_ITEM),
            orderstatus: table(&tables::ORDER_STATUS),
            vistapackage: table(&tables::VISTA_PACKAGE),
        }
    }

    /// Every table, in finalization order
    pub fn all(&self) -> [&DedupTable; 14] {
        [
            &self.sstaff,
            &self.maritalstatus,
            &self.sta3n,
            &self.location,
            &self.immunizationname,
            &self.reaction,
            &self.providernarrative,
            &self.localdrug,
            &self.nationaldrug,
            &self.dosageform,
            &self.pharmacyorderableitem,
            &self.orderableitem,
            &self.orderstatus,
            &self.vistapackage,
        ]
    }
}

/// Shared state of one export run
pub struct RunContext {
    run_id: u64,
    key_space: KeySpace,
    output_dir: Option<PathBuf>,
    detail: DetailTables,
    dimensions: DimensionTables,
    clinicians: Vec<SurrogateKey>,
    default_dosage: SurrogateKey,
    formatter: Arc<dyn RecordFormatter>,
    pub(super) finalized: AtomicBool,
}

impl RunContext {
    /// Opens every detail table under `output_dir` with the default formatter
    ///
    /// # Errors
    ///
    /// Returns [`CdwError::Setup`] if the directory or any table file cannot
    /// be created.
    pub fn create(output_dir: impl AsRef<Path>, key_space: KeySpace) -> Result<Self> {
        Self::with_formatter(output_dir, key_space, Arc::new(CdwFormatter::new()))
    }

    /// Like [`create`](Self::create), with custom formatting rules
    pub fn with_formatter(
        output_dir: impl AsRef<Path>,
        key_space: KeySpace,
        formatter: Arc<dyn RecordFormatter>,
    ) -> Result<Self> {
        let dir = output_dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| CdwError::setup(dir.display().to_string(), e))?;

        let start = key_space.detail_start();
        let detail = DetailTables::build(|spec| {
            DetailTableWriter::open(spec.name, dir.join(spec.file_name()), spec.header, start)
        })?;

        info!(
            output_dir = %dir.display(),
            key_start = start,
            dimension_key_start = key_space.dimension_start(),
            "Opened detail tables"
        );
        Ok(Self::assemble(key_space, Some(dir.to_path_buf()), detail, formatter))
    }

    /// Creates a context whose tables discard their output
    ///
    /// Keys are allocated exactly as in a real run.
    pub fn dry_run(key_space: KeySpace, formatter: Arc<dyn RecordFormatter>) -> Self {
        let start = key_space.detail_start();
        let detail = DetailTables::build(|spec| {
            Ok::<_, Infallible>(DetailTableWriter::discarding(spec.name, spec.header, start))
        });
        let detail = match detail {
            Ok(detail) => detail,
            Err(never) => match never {},
        };
        Self::assemble(key_space, None, detail, formatter)
    }

    fn assemble(
        key_space: KeySpace,
        output_dir: Option<PathBuf>,
        detail: DetailTables,
        formatter: Arc<dyn RecordFormatter>,
    ) -> Self {
        let dimensions = DimensionTables::new(key_space.dimension_start());

        let clinicians = formatter
            .clinician_names(CLINICIANS)
            .iter()
            .enumerate()
            .map(|(i, name)| dimensions.sstaff.add_fact(&i.to_string(), vec![clean(name)]))
            .collect();

        let default_dosage = dimensions.dosageform.add_fact(
            DEFAULT_DOSAGE_KEY,
            vec!["1".to_string(), "Once per day.".to_string()],
        );

        Self {
            run_id: NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed),
            key_space,
            output_dir,
            detail,
            dimensions,
            clinicians,
            default_dosage,
            formatter,
            finalized: AtomicBool::new(false),
        }
    }

    /// Process-unique id of this run
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Key ranges of this run
    pub fn key_space(&self) -> KeySpace {
        self.key_space
    }

    /// Output directory, `None` for a dry run
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Detail table writers
    pub fn detail(&self) -> &DetailTables {
        &self.detail
    }

    /// Dimension tables
    pub fn dimensions(&self) -> &DimensionTables {
        &self.dimensions
    }

    /// Staff keys of the clinician roster
    pub fn clinicians(&self) -> &[SurrogateKey] {
        &self.clinicians
    }

    /// Staff key used when an encounter has no provider
    pub fn fallback_staff(&self) -> SurrogateKey {
        SurrogateKey::new(self.key_space.dimension_start())
    }

    /// Dosage form referenced by medications without dosage instructions
    pub fn default_dosage(&self) -> SurrogateKey {
        self.default_dosage
    }

    /// Formatting rules
    pub fn formatter(&self) -> &dyn RecordFormatter {
        self.formatter.as_ref()
    }

    /// Whether the dimension tables have been written
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("key_space", &self.key_space)
            .field("output_dir", &self.output_dir)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
