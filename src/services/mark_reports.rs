use serde::Serialize;

use crate::db::types::Grade;
use crate::repositories::exam_marks::ExamMarkRow;
use crate::services::grading::{round2, Attendance};

/// One bucket of the grade distribution; marks without a grade land in `ungraded`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GradeBucket {
    pub(crate) grade: &'static str,
    pub(crate) count: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GradeDistribution {
    graded: [i64; 6],
    ungraded: i64,
}

impl GradeDistribution {
    pub(crate) fn from_counts(counts: impl IntoIterator<Item = (Option<Grade>, i64)>) -> Self {
        let mut distribution = Self::default();
        for (grade, count) in counts {
            distribution.add(grade, count);
        }
        distribution
    }

    fn add(&mut self, grade: Option<Grade>, count: i64) {
        match grade {
            Some(grade) => {
                if let Some(index) = Grade::ALL.iter().position(|candidate| *candidate == grade) {
                    self.graded[index] += count;
                }
            }
            None => self.ungraded += count,
        }
    }

    pub(crate) fn graded_total(&self) -> i64 {
        self.graded.iter().sum()
    }

    /// Share of graded marks that are not F, in percent.
    pub(crate) fn pass_rate(&self) -> f64 {
        let graded = self.graded_total();
        if graded == 0 {
            return 0.0;
        }
        let passed: i64 = Grade::ALL
            .iter()
            .zip(self.graded.iter())
            .filter(|(grade, _)| grade.is_passing())
            .map(|(_, count)| count)
            .sum();
        round2(passed as f64 / graded as f64 * 100.0)
    }

    /// Every bucket, in the order A+, A, A-, B, C, F, ungraded.
    pub(crate) fn buckets(&self) -> Vec<GradeBucket> {
        Grade::ALL
            .iter()
            .zip(self.graded.iter())
            .map(|(grade, count)| GradeBucket { grade: grade.as_str(), count: *count })
            .chain(std::iter::once(GradeBucket { grade: "ungraded", count: self.ungraded }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MarkStatistics {
    pub(crate) total_records: usize,
    pub(crate) average_total_marks: f64,
    pub(crate) average_attendance_percentage: f64,
    pub(crate) grade_distribution: Vec<GradeBucket>,
    pub(crate) pass_rate: f64,
}

/// The slice of a mark the statistics read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkSample {
    pub(crate) total_marks: Option<f64>,
    pub(crate) grade: Option<Grade>,
    pub(crate) attendance: Attendance,
}

impl From<&ExamMarkRow> for MarkSample {
    fn from(row: &ExamMarkRow) -> Self {
        Self {
            total_marks: row.total_marks,
            grade: row.grade,
            attendance: Attendance {
                total_class: row.total_class,
                present: row.present,
                absent: row.absent,
            },
        }
    }
}

pub(crate) fn summarize(samples: impl IntoIterator<Item = MarkSample>) -> MarkStatistics {
    let mut total_records = 0usize;
    let mut marks_sum = 0.0;
    let mut marks_count = 0usize;
    let mut attendance_sum = 0.0;
    let mut attendance_count = 0usize;
    let mut distribution = GradeDistribution::default();

    for sample in samples {
        total_records += 1;
        if let Some(total) = sample.total_marks {
            marks_sum += total;
            marks_count += 1;
        }
        if sample.attendance.total_class > 0 {
            let Attendance { present, total_class, .. } = sample.attendance;
            attendance_sum += f64::from(present) / f64::from(total_class) * 100.0;
            attendance_count += 1;
        }
        distribution.add(sample.grade, 1);
    }

    MarkStatistics {
        total_records,
        average_total_marks: average(marks_sum, marks_count),
        average_attendance_percentage: average(attendance_sum, attendance_count),
        grade_distribution: distribution.buckets(),
        pass_rate: distribution.pass_rate(),
    }
}

fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        round2(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total: Option<f64>, grade: Option<Grade>, total_class: i32, present: i32) -> MarkSample {
        MarkSample {
            total_marks: total,
            grade,
            attendance: Attendance { total_class, present, absent: 0 },
        }
    }

    #[test]
    fn averages_marks_and_attendance() {
        let stats = summarize([
            sample(Some(80.0), Some(Grade::APlus), 10, 10),
            sample(Some(40.0), Some(Grade::C), 10, 5),
        ]);

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.average_total_marks, 60.0);
        assert_eq!(stats.average_attendance_percentage, 75.0);
        assert_eq!(stats.pass_rate, 100.0);
    }

    #[test]
    fn empty_slice_reports_zeroes_and_every_bucket() {
        let stats = summarize(Vec::new());

        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.average_total_marks, 0.0);
        assert_eq!(stats.average_attendance_percentage, 0.0);
        assert_eq!(stats.pass_rate, 0.0);
        let labels: Vec<_> = stats.grade_distribution.iter().map(|bucket| bucket.grade).collect();
        assert_eq!(labels, ["A+", "A", "A-", "B", "C", "F", "ungraded"]);
        assert!(stats.grade_distribution.iter().all(|bucket| bucket.count == 0));
    }

    #[test]
    fn ungraded_and_zero_class_records_are_skipped_by_averages() {
        let stats = summarize([
            sample(None, None, 0, 0),
            sample(Some(30.0), Some(Grade::F), 4, 1),
            sample(Some(55.0), Some(Grade::B), 0, 0),
        ]);

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.average_total_marks, 42.5);
        assert_eq!(stats.average_attendance_percentage, 25.0);
        assert_eq!(stats.pass_rate, 50.0);
        let ungraded = stats.grade_distribution.last().expect("ungraded bucket");
        assert_eq!(ungraded.count, 1);
    }

    #[test]
    fn pass_rate_rounds_to_two_decimals() {
        let distribution = GradeDistribution::from_counts([
            (Some(Grade::A), 1),
            (Some(Grade::F), 2),
            (None, 5),
        ]);
        assert_eq!(distribution.graded_total(), 3);
        assert_eq!(distribution.pass_rate(), 33.33);
    }
}
