//! Export rows and the import template.

use crate::model::school::School;

/// One record as a table row in export-header order.
pub fn school_to_row(school: &School) -> Vec<String> {
    let mut row = vec![
        school.name.clone(),
        school.address.clone(),
        school.major.clone(),
        school.recruitment_count.to_string(),
    ];
    for (year, _, _) in super::SCORE_COLUMNS {
        let range = school.scores.get(year);
        row.push(range.max.to_string());
        row.push(range.min.to_string());
    }
    row.push(school.contact.email.clone());
    row.push(school.contact.phone.clone());
    row.push(school.remark.clone().unwrap_or_default());
    row
}

/// Two example rows that show authors the expected cell formats.
pub fn template_rows() -> Vec<Vec<String>> {
    const ROWS: [[&str; 15]; 2] = [
        [
            "示例大学",
            "北京市海淀区XX路XX号",
            "计算机科学与技术",
            "20",
            "380",
            "350",
            "375",
            "345",
            "370",
            "340",
            "365",
            "335",
            "example@university.edu.cn",
            "010-12345678",
            "270-310分",
        ],
        [
            "示例理工大学",
            "上海市浦东新区XX路XX号",
            "软件工程",
            "15",
            "370",
            "340",
            "365",
            "335",
            "360",
            "330",
            "355",
            "325",
            "info@example.edu.cn",
            "021-87654321",
            "300分左右",
        ],
    ];
    ROWS.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::school_to_row;
    use crate::model::school::{NewSchool, RecruitmentCount, ScoreRange, ScoreYear};
    use crate::table::export_headers;

    #[test]
    fn row_follows_export_header_order() {
        let mut input = NewSchool::new("甲大学");
        input.major = "软件工程".to_string();
        input.recruitment_count = RecruitmentCount::Range("2-4".to_string());
        input
            .scores
            .insert(ScoreYear::Y2024, ScoreRange::new(380, 350));
        input
            .scores
            .insert(ScoreYear::Y2021, ScoreRange::new(365, 335));
        let school = input.into_school(1, "2024-03-01 10:00:00");

        let row = school_to_row(&school);
        assert_eq!(row.len(), export_headers().len());
        assert_eq!(row[0], "甲大学");
        assert_eq!(row[3], "2-4");
        assert_eq!(row[4], "380");
        assert_eq!(row[5], "350");
        assert_eq!(row[10], "365");
        assert_eq!(row[11], "335");
        assert_eq!(row[14], "");
    }
}
