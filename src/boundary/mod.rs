//! Calling the foreign entry point.
//!
//! The callee receives two raw pointers and runs synchronously on the
//! caller's thread. Memory stays owned by the caller: [`EntryPoint`] only
//! lends `&mut` borrows for the duration of one call, so nothing the callee
//! is handed can outlive it on the Rust side.

use crate::data::{TransitUnion, TransitValue};
use crate::error::TransitError;
use crate::schema::{FieldDesc, TransitSchema};
use log::{trace, warn};

/// Symbol exported by the embedded-Python bridge.
pub const ENTRY_SYMBOL: &str = "python_function";

/// C signature of an entry point: `void f(R *, union_t *)`.
pub type RawEntryPoint<R> = unsafe extern "C" fn(data: *mut R, value: *mut TransitUnion);

/// Fields a callee is documented to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationContract {
    record_fields: &'static [&'static str],
    value: bool,
}

impl MutationContract {
    /// The callee only reads.
    pub const fn read_only() -> Self {
        Self {
            record_fields: &[],
            value: false,
        }
    }

    /// The callee may write `record_fields`, and the union when `value` is set.
    pub const fn new(record_fields: &'static [&'static str], value: bool) -> Self {
        Self {
            record_fields,
            value,
        }
    }

    pub fn allows(&self, field: &str) -> bool {
        self.record_fields.contains(&field)
    }

    pub fn allows_value(&self) -> bool {
        self.value
    }

    pub fn record_fields(&self) -> &'static [&'static str] {
        self.record_fields
    }

    /// First contracted name that is not one of `fields`.
    pub fn unknown_field(&self, fields: &[FieldDesc]) -> Option<&'static str> {
        self.record_fields
            .iter()
            .copied()
            .find(|name| !fields.iter().any(|f| f.name == *name))
    }
}

impl Default for MutationContract {
    fn default() -> Self {
        Self::read_only()
    }
}

/// A foreign function taking a record of schema `R` and the transit union.
pub struct EntryPoint<R: TransitSchema> {
    symbol: &'static str,
    func: RawEntryPoint<R>,
    contract: MutationContract,
}

impl<R: TransitSchema> EntryPoint<R> {
    /// Wrap a raw entry point. The contract starts out read-only.
    ///
    /// # Safety
    /// `func` must be compiled against exactly the layout of `R` and
    /// [`TransitUnion`], must only access memory through the two pointers it
    /// receives, and must not keep either pointer after it returns.
    pub unsafe fn new(symbol: &'static str, func: RawEntryPoint<R>) -> Self {
        Self {
            symbol,
            func,
            contract: MutationContract::read_only(),
        }
    }

    /// Replace the contract. Every field it names must exist in `R`.
    pub fn with_contract(mut self, contract: MutationContract) -> Result<Self, TransitError> {
        if let Some(field) = contract.unknown_field(R::FIELDS) {
            warn!("{} contract names `{}`, not a field of {}", self.symbol, field, R::NAME);
            return Err(TransitError::UnknownContractField {
                schema: R::NAME,
                field,
            });
        }
        self.contract = contract;
        Ok(self)
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn contract(&self) -> &MutationContract {
        &self.contract
    }

    /// Call the entry point with caller-owned storage.
    pub fn invoke(&self, record: &mut R, value: &mut TransitUnion) {
        trace!("-> {}({} {}, {:?})", self.symbol, R::NAME, R::VERSION, value);
        // SAFETY: the callee honours the layout and no-escape rules (see `new`),
        // and both borrows outlive the call.
        unsafe { (self.func)(&mut *record as *mut R, &mut *value as *mut TransitUnion) };
        trace!("<- {}", self.symbol);
    }

    /// Call with a tagged value, decaying it for the call and lifting the
    /// result back with the same interpretation.
    pub fn invoke_value(&self, record: &mut R, value: &mut TransitValue) {
        let kind = value.kind();
        let mut raw = value.to_raw();
        self.invoke(record, &mut raw);
        *value = TransitValue::from_raw(&raw, kind);
    }

    /// Call and then confirm that only contracted fields changed.
    ///
    /// Fields are compared bitwise, so a NaN left in place is not a change.
    pub fn invoke_checked(
        &self,
        record: &mut R,
        value: &mut TransitUnion,
    ) -> Result<(), TransitError> {
        let before = record.field_values();
        let value_before = value.bits();

        self.invoke(record, value);

        let after = record.field_values();
        for ((field, old), new) in R::FIELDS.iter().zip(&before).zip(&after) {
            if !old.same_bits(new) && !self.contract.allows(field.name) {
                warn!(
                    "{} changed {}.{} from {:?} to {:?}",
                    self.symbol,
                    R::NAME,
                    field.name,
                    old,
                    new
                );
                return Err(TransitError::UndocumentedMutation {
                    schema: R::NAME,
                    field: field.name,
                });
            }
        }

        if value.bits() != value_before && !self.contract.allows_value() {
            warn!("{} changed the transit union", self.symbol);
            return Err(TransitError::UnionMutation);
        }

        Ok(())
    }
}

impl<R: TransitSchema> std::fmt::Debug for EntryPoint<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint")
            .field("symbol", &self.symbol)
            .field("schema", &R::NAME)
            .field("contract", &self.contract)
            .finish()
    }
}

#[cfg(feature = "python-callee")]
mod python {
    use super::{EntryPoint, MutationContract, ENTRY_SYMBOL};
    use crate::data::TransitUnion;
    use crate::error::TransitError;
    use crate::schema::TransitRecord;

    extern "C" {
        fn python_function(data: *mut TransitRecord, value: *mut TransitUnion);
    }

    /// The Python hook may rewrite the coordinates, the flag and the union;
    /// the canary must come back untouched.
    pub const PYTHON_CONTRACT: MutationContract = MutationContract::new(&["x", "y", "flag"], true);

    /// Entry point backed by the linked `python_function` symbol.
    pub fn python_entry_point() -> Result<EntryPoint<TransitRecord>, TransitError> {
        // SAFETY: the cffi bridge is generated from the same schema
        // (see `bindings::c_header`) and does not retain its arguments.
        unsafe { EntryPoint::new(ENTRY_SYMBOL, python_function) }.with_contract(PYTHON_CONTRACT)
    }
}

#[cfg(feature = "python-callee")]
pub use python::{python_entry_point, PYTHON_CONTRACT};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ValueKind;
    use crate::schema::{CanaryRecord, CoordRecord, FlagRecord, TransitRecord};

    unsafe extern "C" fn noop(_data: *mut FlagRecord, _value: *mut TransitUnion) {}

    unsafe extern "C" fn noop_canary(_data: *mut CanaryRecord, _value: *mut TransitUnion) {}

    unsafe extern "C" fn bump_y(data: *mut CoordRecord, value: *mut TransitUnion) {
        let record = &mut *data;
        record.y += 1;
        let value = &mut *value;
        value.set_int(value.int_value() * 2);
    }

    unsafe extern "C" fn set_flag(data: *mut FlagRecord, _value: *mut TransitUnion) {
        (*data).flag = true;
    }

    #[test]
    fn test_invoke_passes_caller_storage() {
        let entry = unsafe { EntryPoint::new("bump_y", bump_y as RawEntryPoint<CoordRecord>) };
        let mut record = CoordRecord { x: 1, y: 2 };
        let mut value = TransitUnion::from_int(21);

        entry.invoke(&mut record, &mut value);

        assert_eq!(record.y, 3);
        assert_eq!(record.x, 1);
        assert_eq!(value.int_value(), 42);
    }

    #[test]
    fn test_invoke_value_keeps_interpretation() {
        let entry = unsafe { EntryPoint::new("bump_y", bump_y as RawEntryPoint<CoordRecord>) };
        let mut record = CoordRecord::default();
        let mut value = TransitValue::from(5);

        entry.invoke_value(&mut record, &mut value);

        assert_eq!(value.kind(), ValueKind::Integer);
        assert_eq!(value, TransitValue::Integer(10));
    }

    #[test]
    fn test_read_only_callee_passes_check() {
        let entry = unsafe { EntryPoint::new("noop", noop as RawEntryPoint<FlagRecord>) };
        let mut record = FlagRecord { x: f32::NAN, y: 2, flag: false };
        let mut value = TransitUnion::from_int(42);

        assert!(entry.invoke_checked(&mut record, &mut value).is_ok());
    }

    #[test]
    fn test_undocumented_mutation_is_reported() {
        let entry = unsafe { EntryPoint::new("bump_y", bump_y as RawEntryPoint<CoordRecord>) };
        let mut record = CoordRecord { x: 1, y: 2 };
        let mut value = TransitUnion::from_int(1);

        let err = entry.invoke_checked(&mut record, &mut value).unwrap_err();
        assert!(matches!(
            err,
            TransitError::UndocumentedMutation { schema: "CoordRecord", field: "y" }
        ));
    }

    #[test]
    fn test_union_mutation_needs_contract() {
        let entry = unsafe { EntryPoint::new("bump_y", bump_y as RawEntryPoint<CoordRecord>) }
            .with_contract(MutationContract::new(&["y"], false))
            .unwrap();
        let mut record = CoordRecord::default();
        let mut value = TransitUnion::from_int(1);

        let err = entry.invoke_checked(&mut record, &mut value).unwrap_err();
        assert!(matches!(err, TransitError::UnionMutation));

        let entry = entry.with_contract(MutationContract::new(&["y"], true)).unwrap();
        let mut value = TransitUnion::from_int(1);
        assert!(entry.invoke_checked(&mut record, &mut value).is_ok());
    }

    #[test]
    fn test_contracted_flag_write() {
        let entry = unsafe { EntryPoint::new("set_flag", set_flag as RawEntryPoint<FlagRecord>) }
            .with_contract(MutationContract::new(&["flag"], false))
            .unwrap();
        let mut record = FlagRecord { x: 1.5, y: 2, flag: false };
        let mut value = TransitUnion::default();

        entry.invoke_checked(&mut record, &mut value).unwrap();
        assert!(record.flag);
        assert_eq!(entry.symbol(), "set_flag");
        assert!(entry.contract().allows("flag"));
        assert!(!entry.contract().allows("x"));
    }

    #[test]
    fn test_contract_with_misspelt_field_is_rejected() {
        let typo = MutationContract::new(&["x", "sentinl"], true);
        assert_eq!(typo.unknown_field(CanaryRecord::FIELDS), Some("sentinl"));

        let err = unsafe { EntryPoint::new("noop", noop_canary as RawEntryPoint<CanaryRecord>) }
            .with_contract(typo)
            .unwrap_err();
        assert!(matches!(
            err,
            TransitError::UnknownContractField { schema: "CanaryRecord", field: "sentinl" }
        ));
    }

    #[test]
    fn test_contract_is_checked_against_its_own_record() {
        // `flag` exists in v3 but not in v1.
        let contract = MutationContract::new(&["flag"], false);
        assert!(unsafe { EntryPoint::new("set_flag", set_flag as RawEntryPoint<FlagRecord>) }
            .with_contract(contract)
            .is_ok());
        assert!(unsafe { EntryPoint::new("bump_y", bump_y as RawEntryPoint<CoordRecord>) }
            .with_contract(contract)
            .is_err());
        assert_eq!(MutationContract::read_only().unknown_field(CoordRecord::FIELDS), None);
    }

    #[test]
    fn test_python_contract_names_record_fields() {
        let contract = MutationContract::new(&["x", "y", "flag"], true);
        assert_eq!(contract.unknown_field(TransitRecord::FIELDS), None);
        assert!(!contract.allows("sentinel"));
    }
}
