//! Warehouse table catalogue
//!
//! Names and column layouts of every table in the extract, plus the
//! foreign-key relationships between them.

/// Name and columns of one output table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name, also the output file stem
    pub name: &'static str,
    /// Column names; the first column is the primary key
    pub header: &'static [&'static str],
}

impl TableSpec {
    /// Output file name
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    /// Primary key column
    pub fn key_column(&self) -> &'static str {
        self.header[0]
    }
}

/// A column whose values must be keys of another table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing table
    pub table: &'static str,
    /// Referencing column
    pub column: &'static str,
    /// Referenced table; the reference targets its primary key
    pub references: &'static str,
}

const fn table(name: &'static str, header: &'static [&'static str]) -> TableSpec {
    TableSpec { name, header }
}

const fn fk(table: &'static str, column: &'static str, references: &'static str) -> ForeignKey {
    ForeignKey {
        table,
        column,
        references,
    }
}

// Patient tables

pub const LOOKUP_PATIENT: TableSpec = table(
    "lookuppatient",
    &["PatientSID", "Sta3n", "PatientIEN", "PatientICN", "PatientFullCN", "PatientName", "TestPatient"],
);

pub const SPATIENT: TableSpec = table(
    "spatient",
    &[
        "PatientSID",
        "PatientName",
        "PatientLastName",
        "PatientFirstName",
        "PatientSSN",
        "Age",
        "BirthDateTime",
        "DeceasedFlag",
        "DeathDateTime",
        "Gender",
        "SelfIdentifiedGender",
        "Religion",
        "MaritalStatus",
        "MaritalStatusSID",
        "PatientEnteredDateTime",
    ],
);

pub const SPATIENT_ADDRESS: TableSpec = table(
    "spatientaddress",
    &[
        "SPatientAddressSID",
        "PatientSID",
        "AddressType",
        "NameOfContact",
        "RelationshipToPatient",
        "StreetAddress1",
        "StreetAddress2",
        "StreetAddress3",
        "City",
        "State",
        "Zip",
        "PostalCode",
        "Country",
        "GISMatchScore",
        "GISStreetSide",
        "GISPatientAddressLongitude",
        "GISPatientAddressLatitude",
        "GISFIPSCode",
    ],
);

pub const SPATIENT_PHONE: TableSpec = table(
    "spatientphone",
    &[
        "SPatientPhoneSID",
        "PatientSID",
        "PatientContactType",
        "NameOfContact",
        "RelationshipToPatient",
        "PhoneNumber",
        "WorkPhoneNumber",
        "EmailAddress",
    ],
);

pub const PATIENT_RACE: TableSpec = table("patientrace", &["PatientRaceSID", "PatientSID", "Race"]);

pub const PATIENT_ETHNICITY: TableSpec = table(
    "patientethnicity",
    &["PatientEthnicitySID", "PatientSID", "Ethnicity"],
);

// Encounter tables

pub const CONSULT: TableSpec = table("consult", &["ConsultSID", "ToRequestServiceSID"]);

pub const VISIT: TableSpec = table(
    "visit",
    &["VisitSID", "VisitDateTime", "CreatedByStaffSID", "LocationSID", "PatientSID"],
);

pub const APPOINTMENT: TableSpec = table(
    "appointment",
    &[
        "AppointmentSID",
        "Sta3n",
        "PatientSID",
        "AppointmentDateTime",
        "AppointmentMadeDate",
        "AppointmentTypeSID",
        "AppointmentStatus",
        "VisitSID",
        "LocationSID",
        "PurposeOfVisit",
        "SchedulingRequestType",
        "FollowUpVisitFlag",
        "LengthOfAppointment",
        "ConsultSID",
        "CheckInDateTime",
        "CheckOutDateTime",
    ],
);

pub const INPATIENT: TableSpec = table("inpatient", &["InpatientSID", "PatientSID", "AdmitDateTime"]);

// Immunization tables

pub const IMMUNIZATION: TableSpec = table(
    "immunization",
    &[
        "ImmunizationSID",
        "ImmunizationIEN",
        "Sta3n",
        "PatientSID",
        "ImmunizationNameSID",
        "Series",
        "Reaction",
        "VisitDateTime",
        "ImmunizationDateTime",
        "OrderingStaffSID",
        "ImmunizingStaffSID",
        "VisitSID",
        "ImmunizationComments",
        "ImmunizationRemarks",
    ],
);

// Allergy tables

pub const ALLERGY: TableSpec = table(
    "allergy",
    &[
        "AllergySID",
        "AllergyIEN",
        "Sta3n",
        "PatientSID",
        "AllergyType",
        "AllergicReactant",
        "LocalDrugSID",
        "DrugNameWithoutDoseSID",
        "DrugClassSID",
        "ReactantSID",
        "DrugIngredientSID",
        "OriginationDateTime",
        "OriginatingStaffSID",
        "ObservedHistorical",
        "Mechanism",
        "VerifiedFlag",
        "VerificatiionDateTime",
        "VerifyingStaffSID",
        "EnteredInErrorFlag",
    ],
);

pub const ALLERGIC_REACTION: TableSpec = table(
    "allergicreaction",
    &["AllergicReactionSID", "AllergySID", "AllergyIEN", "Sta3n", "ReactionSID"],
);

pub const ALLERGY_COMMENT: TableSpec = table(
    "allergycomment",
    &[
        "AllergyCommentSID",
        "AllergySID",
        "AllergyIEN",
        "Sta3n",
        "PatientSID",
        "OriginationDateTime",
        "EnteringStaffSID",
        "AllergyComment",
        "CommentEnteredDateTime",
    ],
);

// Condition tables

pub const PROBLEM_LIST: TableSpec = table(
    "problemlist",
    &[
        "ProblemListSID",
        "Sta3n",
        "ICD9SID",
        "ICD10SID",
        "PatientSID",
        "ProviderNarrativeSID",
        "EnteredDateTime",
        "OnsetDateTime",
        "ProblemListCondition",
        "RecordingProviderSID",
        "ResolvedDateTime",
        "SNOMEDCTConceptCode",
    ],
);

pub const VDIAGNOSIS: TableSpec = table(
    "vdiagnosis",
    &[
        "VDiagnosisSID",
        "Sta3n",
        "ICD9SID",
        "ICD10SID",
        "PatientSID",
        "VisitSID",
        "VisitDateTime",
        "VDiagnosisDateTime",
        "ProviderNarrativeSID",
        "ProblemListSID",
        "OrderingProviderSID",
        "EncounterProviderSID",
    ],
);

// Medication tables

pub const RX_OUTPATIENT: TableSpec = table(
    "rxoutpatient",
    &[
        "RxOutpatSID",
        "Sta3n",
        "RxNumber",
        "IssueDate",
        "CancelDate",
        "FinishingDateTime",
        "PatientSID",
        "ProviderSID",
        "EnteredByStaffSID",
        "LocalDrugSID",
        "NationalDrugSID",
        "PharmacyOrderableItemSID",
        "MaxRefills",
        "RxStatus",
        "OrderedQuantity",
    ],
);

pub const RX_OUTPAT_FILL: TableSpec = table(
    "rxoutpatfill",
    &["RxOutpatFillSID", "RxOutpatSID", "Qty", "DaysSupply"],
);

pub const NON_VA_MED: TableSpec = table(
    "nonvamed",
    &[
        "NonVAMedSID",
        "PatientSID",
        "NonVAMedIEN",
        "Sta3n",
        "LocalDrugSID",
        "Dosage",
        "MedicationRoute",
        "Schedule",
        "NonVAMedStatus",
        "CPRSOrderSID",
        "StartDateTime",
        "DocumentedDateTime",
        "NonVAMedComments",
    ],
);

pub const CPRS_ORDER: TableSpec = table(
    "cprsorder",
    &[
        "CPRSOrderID",
        "Sta3n",
        "PatientSID",
        "OrderStaffSID",
        "EnteredByStaffSID",
        "EnteredDateTime",
        "OrderStatusSID",
        "VistaPackageSID",
        "OrderStartDateTime",
        "OrderStopDateTime",
        "PackageReference",
    ],
);

pub const ORDERED_ITEM: TableSpec = table(
    "ordereditem",
    &["OrderedItemSID", "CPRSOrderSID", "OrderableItemSID"],
);

// Other clinical event tables

pub const OBSERVATION: TableSpec = table(
    "observation",
    &[
        "ObservationSID",
        "ObservationDateTime",
        "PatientSID",
        "VisitSID",
        "Code",
        "Description",
        "Value",
        "Units",
        "ValueType",
    ],
);

pub const PROCEDURE: TableSpec = table(
    "procedure",
    &[
        "ProcedureSID",
        "ProcedureDateTime",
        "PatientSID",
        "VisitSID",
        "Code",
        "Description",
        "Cost",
        "ReasonCode",
        "ReasonDescription",
    ],
);

pub const CARE_PLAN: TableSpec = table(
    "careplan",
    &[
        "CarePlanSID",
        "StartDateTime",
        "StopDateTime",
        "PatientSID",
        "VisitSID",
        "Code",
        "Description",
        "ReasonCode",
        "ReasonDescription",
    ],
);

pub const IMAGING_STUDY: TableSpec = table(
    "imagingstudy",
    &[
        "ImagingStudySID",
        "StudyDateTime",
        "PatientSID",
        "VisitSID",
        "BodySiteCode",
        "BodySiteDescription",
        "ModalityCode",
        "ModalityDescription",
        "SOPCode",
        "SOPDescription",
    ],
);

// Dimension tables

pub const SSTAFF: TableSpec = table("sstaff", &["StaffSID", "StaffName"]);

pub const MARITAL_STATUS: TableSpec =
    table("maritalstatus", &["MaritalStatusSID", "MaritalStatusCode"]);

pub const STA3N: TableSpec = table("sta3n", &["Sta3n", "Sta3nName", "TimeZone"]);

pub const LOCATION: TableSpec = table("location", &["LocationSID", "LocationName"]);

pub const IMMUNIZATION_NAME: TableSpec = table(
    "immunizationname",
    &["ImmunizationNameSID", "ImmunizationName", "CVXCode", "MaxInSeries"],
);

pub const REACTION: TableSpec = table("reaction", &["ReactionSID", "Reaction", "VUID"]);

pub const PROVIDER_NARRATIVE: TableSpec =
    table("providernarrative", &["ProviderNarrativeSID", "ProviderNarrative"]);

pub const LOCAL_DRUG: TableSpec = table(
    "localdrug",
    &[
        "LocalDrugSID",
        "LocalDrugIEN",
        "Sta3n",
        "LocalDrugNameWithDose",
        "NationalDrugSID",
        "NationalDrugNameWithDose",
        "PharmacyOrderableItemSID",
    ],
);

pub const NATIONAL_DRUG: TableSpec = table(
    "nationaldrug",
    &["NationalDrugSID", "DrugNameWithDose", "DosageFormSID", "InactivationDate", "VUID"],
);

pub const DOSAGE_FORM: TableSpec =
    table("dosageform", &["DosageFormSID", "DosageFormIEN", "DosageForm"]);

pub const PHARMACY_ORDERABLE_ITEM: TableSpec = table(
    "pharmacyorderableitem",
    &["PharmacyOrderableItemSID", "PharmacyOrderableItem", "SupplyFlag"],
);

pub const ORDERABLE_ITEM: TableSpec = table(
    "orderableitem",
    &["OrderableItemSID", "OrderableItemName", "IVBaseFlag", "IVAdditiveFlag"],
);

pub const ORDER_STATUS: TableSpec = table("orderstatus", &["OrderStatusSID", "OrderStatus"]);

pub const VISTA_PACKAGE: TableSpec = table("vistapackage", &["VistaPackageSID", "VistaPackage"]);

/// Detail tables, in the order their files are opened
pub const DETAIL_TABLES: &[TableSpec] = &[
    LOOKUP_PATIENT,
    SPATIENT,
    SPATIENT_ADDRESS,
    SPATIENT_PHONE,
    PATIENT_RACE,
    PATIENT_ETHNICITY,
    CONSULT,
    VISIT,
    APPOINTMENT,
    INPATIENT,
    IMMUNIZATION,
    ALLERGY,
    ALLERGIC_REACTION,
    ALLERGY_COMMENT,
    PROBLEM_LIST,
    VDIAGNOSIS,
    RX_OUTPATIENT,
    RX_OUTPAT_FILL,
    NON_VA_MED,
    CPRS_ORDER,
    ORDERED_ITEM,
    OBSERVATION,
    PROCEDURE,
    CARE_PLAN,
    IMAGING_STUDY,
];

/// Dimension tables, in finalization order
pub const DIMENSION_TABLES: &[TableSpec] = &[
    SSTAFF,
    MARITAL_STATUS,
    STA3N,
    LOCATION,
    IMMUNIZATION_NAME,
    REACTION,
    PROVIDER_NARRATIVE,
    LOCAL_DRUG,
    NATIONAL_DRUG,
    DOSAGE_FORM,
    PHARMACY_ORDERABLE_ITEM,
    ORDERABLE_ITEM,
    ORDER_STATUS,
    VISTA_PACKAGE,
];

/// Every column that holds a key of another table
pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("lookuppatient", "PatientSID", "spatient"),
    fk("lookuppatient", "Sta3n", "sta3n"),
    fk("spatient", "MaritalStatusSID", "maritalstatus"),
    fk("spatientaddress", "PatientSID", "spatient"),
    fk("spatientphone", "PatientSID", "spatient"),
    fk("patientrace", "PatientSID", "spatient"),
    fk("patientethnicity", "PatientSID", "spatient"),
    fk("visit", "CreatedByStaffSID", "sstaff"),
    fk("visit", "LocationSID", "location"),
    fk("visit", "PatientSID", "spatient"),
    fk("appointment", "Sta3n", "sta3n"),
    fk("appointment", "PatientSID", "spatient"),
    fk("appointment", "VisitSID", "visit"),
    fk("appointment", "LocationSID", "location"),
    fk("appointment", "ConsultSID", "consult"),
    fk("inpatient", "PatientSID", "spatient"),
    fk("immunization", "Sta3n", "sta3n"),
    fk("immunization", "PatientSID", "spatient"),
    fk("immunization", "ImmunizationNameSID", "immunizationname"),
    fk("immunization", "OrderingStaffSID", "sstaff"),
    fk("immunization", "ImmunizingStaffSID", "sstaff"),
    fk("immunization", "VisitSID", "visit"),
    fk("allergy", "Sta3n", "sta3n"),
    fk("allergy", "PatientSID", "spatient"),
    fk("allergy", "OriginatingStaffSID", "sstaff"),
    fk("allergy", "VerifyingStaffSID", "sstaff"),
    fk("allergicreaction", "AllergySID", "allergy"),
    fk("allergicreaction", "Sta3n", "sta3n"),
    fk("allergicreaction", "ReactionSID", "reaction"),
    fk("allergycomment", "AllergySID", "allergy"),
    fk("allergycomment", "Sta3n", "sta3n"),
    fk("allergycomment", "PatientSID", "spatient"),
    fk("allergycomment", "EnteringStaffSID", "sstaff"),
    fk("problemlist", "Sta3n", "sta3n"),
    fk("problemlist", "PatientSID", "spatient"),
    fk("problemlist", "ProviderNarrativeSID", "providernarrative"),
    fk("problemlist", "RecordingProviderSID", "sstaff"),
    fk("vdiagnosis", "Sta3n", "sta3n"),
    fk("vdiagnosis", "PatientSID", "spatient"),
    fk("vdiagnosis", "VisitSID", "visit"),
    fk("vdiagnosis", "ProviderNarrativeSID", "providernarrative"),
    fk("vdiagnosis", "ProblemListSID", "problemlist"),
    fk("vdiagnosis", "OrderingProviderSID", "sstaff"),
    fk("vdiagnosis", "EncounterProviderSID", "sstaff"),
    fk("rxoutpatient", "Sta3n", "sta3n"),
    fk("rxoutpatient", "PatientSID", "spatient"),
    fk("rxoutpatient", "ProviderSID", "sstaff"),
    fk("rxoutpatient", "EnteredByStaffSID", "sstaff"),
    fk("rxoutpatient", "LocalDrugSID", "localdrug"),
    fk("rxoutpatient", "NationalDrugSID", "nationaldrug"),
    fk("rxoutpatient", "PharmacyOrderableItemSID", "pharmacyorderableitem"),
    fk("rxoutpatfill", "RxOutpatSID", "rxoutpatient"),
    fk("nonvamed", "PatientSID", "spatient"),
    fk("nonvamed", "Sta3n", "sta3n"),
    fk("nonvamed", "LocalDrugSID", "localdrug"),
    fk("nonvamed", "CPRSOrderSID", "cprsorder"),
    fk("cprsorder", "Sta3n", "sta3n"),
    fk("cprsorder", "PatientSID", "spatient"),
    fk("cprsorder", "OrderStaffSID", "sstaff"),
    fk("cprsorder", "EnteredByStaffSID", "sstaff"),
    fk("cprsorder", "OrderStatusSID", "orderstatus"),
    fk("cprsorder", "VistaPackageSID", "vistapackage"),
    fk("ordereditem", "CPRSOrderSID", "cprsorder"),
    fk("ordereditem", "OrderableItemSID", "orderableitem"),
    fk("observation", "PatientSID", "spatient"),
    fk("observation", "VisitSID", "visit"),
    fk("procedure", "PatientSID", "spatient"),
    fk("procedure", "VisitSID", "visit"),
    fk("careplan", "PatientSID", "spatient"),
    fk("careplan", "VisitSID", "visit"),
    fk("imagingstudy", "PatientSID", "spatient"),
    fk("imagingstudy", "VisitSID", "visit"),
    fk("localdrug", "Sta3n", "sta3n"),
    fk("localdrug", "NationalDrugSID", "nationaldrug"),
    fk("localdrug", "PharmacyOrderableItemSID", "pharmacyorderableitem"),
    fk("nationaldrug", "DosageFormSID", "dosageform"),
    fk("reaction", "VUID", "allergicreaction"),
];

/// Looks up any table by name
pub fn find_table(name: &str) -> Option<&'static TableSpec> {
    DETAIL_TABLES
        .iter()
        .chain(DIMENSION_TABLES.iter())
        .find(|t| t.name == name)
}
