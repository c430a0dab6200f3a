use crate::error::NotesError;

pub const INITIAL_MEMBER_ROWS: usize = 4;
pub const DEFAULT_STATUS: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub name: String,
    pub birthday: String,
    pub phone: String,
    pub contacted: bool,
    pub status: String,
}

impl Default for MemberRow {
    fn default() -> Self {
        Self {
            name: String::new(),
            birthday: String::new(),
            phone: String::new(),
            contacted: false,
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl MemberRow {
    fn clear(&mut self) {
        *self = MemberRow::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberField {
    Name(String),
    Birthday(String),
    Phone(String),
    Contacted(bool),
    Status(String),
}

/// Keeps only digits, at most four, as `dd/mm`.
pub fn format_day_month(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() <= 2 {
        return digits;
    }
    format!("{}/{}", &digits[..2], &digits[2..])
}

/// Keeps only digits, at most eight, as `nnnn-nnnn`.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(8).collect();
    if digits.len() <= 4 {
        return digits;
    }
    format!("{}-{}", &digits[..4], &digits[4..])
}

/// Spreadsheet-like roster of the member's own group. Local only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyGroupTable {
    rows: Vec<MemberRow>,
}

impl Default for MyGroupTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MyGroupTable {
    pub fn new() -> Self {
        Self {
            rows: vec![MemberRow::default(); INITIAL_MEMBER_ROWS],
        }
    }

    pub fn rows(&self) -> &[MemberRow] {
        &self.rows
    }

    /// Appends a cleared copy of the first row.
    pub fn add_row(&mut self) {
        let mut row = self.rows.first().cloned().unwrap_or_default();
        row.clear();
        self.rows.push(row);
    }

    pub fn remove_row(&mut self) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        self.rows.pop();
        true
    }

    pub fn edit(&mut self, row: usize, field: MemberField) -> Result<(), NotesError> {
        let count = self.rows.len();
        let member = self.rows.get_mut(row).ok_or_else(|| {
            NotesError::invalid_field(format!(
                "member row {} does not exist ({count} rows)",
                row + 1
            ))
        })?;

        match field {
            MemberField::Name(name) => member.name = name,
            MemberField::Birthday(raw) => member.birthday = format_day_month(&raw),
            MemberField::Phone(raw) => member.phone = format_phone(&raw),
            MemberField::Contacted(flag) => member.contacted = flag,
            MemberField::Status(status) => member.status = status,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_month_is_formatted_live() {
        assert_eq!(format_day_month("0"), "0");
        assert_eq!(format_day_month("07"), "07");
        assert_eq!(format_day_month("071"), "07/1");
        assert_eq!(format_day_month("07/12/1990"), "07/12");
        assert_eq!(format_day_month("ab"), "");
    }

    #[test]
    fn phone_is_formatted_live() {
        assert_eq!(format_phone("8888"), "8888");
        assert_eq!(format_phone("88881"), "8888-1");
        assert_eq!(format_phone("(506) 8888-1234"), "5068-8881");
        assert_eq!(format_phone("8888-12345"), "8888-1234");
    }

    #[test]
    fn table_keeps_at_least_one_row() {
        let mut table = MyGroupTable::new();
        assert_eq!(table.rows().len(), INITIAL_MEMBER_ROWS);
        for _ in 0..INITIAL_MEMBER_ROWS - 1 {
            assert!(table.remove_row());
        }
        assert!(!table.remove_row());
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn added_rows_start_cleared() {
        let mut table = MyGroupTable::new();
        table.edit(0, MemberField::Name("Luis".to_string())).unwrap();
        table.edit(0, MemberField::Contacted(true)).unwrap();
        table.edit(0, MemberField::Status("Visit".to_string())).unwrap();

        table.add_row();
        let added = table.rows().last().unwrap();
        assert_eq!(added, &MemberRow::default());
        assert_eq!(added.status, DEFAULT_STATUS);
    }

    #[test]
    fn edits_are_formatted_and_bounded() {
        let mut table = MyGroupTable::new();
        table.edit(1, MemberField::Phone("88881234".to_string())).unwrap();
        assert_eq!(table.rows()[1].phone, "8888-1234");
        assert!(table.edit(9, MemberField::Name("x".to_string())).is_err());
    }
}
