use crate::exclude::ExclusionSet;
use crate::record::NormalizedRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub excluded_count: usize,
    pub valid_count: usize,
    pub remarked_excluded_count: usize,
}

/// Sorted records plus the views written to the workbook.
///
/// Excluded records sort first, so `excluded()` and `valid()` are the two
/// halves of the same slice.
#[derive(Debug)]
pub struct Report<'a> {
    records: Vec<NormalizedRecord>,
    exclusions: Option<&'a ExclusionSet>,
    summary: Summary,
}

impl<'a> Report<'a> {
    pub fn all(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn excluded(&self) -> &[NormalizedRecord] {
        &self.records[..self.summary.excluded_count]
    }

    pub fn valid(&self) -> &[NormalizedRecord] {
        &self.records[self.summary.excluded_count..]
    }

    /// The exclusion set's entries, unrelated to which records matched.
    pub fn exclusion_list(&self) -> Vec<(&'a str, &'a str)> {
        self.exclusions
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    pub fn exclusions_enabled(&self) -> bool {
        self.exclusions.is_some()
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}

/// Sorts by excluded first, then host ascending. The sort is stable, so
/// equal hosts keep their input order.
pub fn assemble(mut records: Vec<NormalizedRecord>, exclusions: Option<&ExclusionSet>) -> Report<'_> {
    records.sort_by(|a, b| b.excluded.cmp(&a.excluded).then_with(|| a.host.cmp(&b.host)));

    let total = records.len();
    let excluded_count = records.iter().take_while(|r| r.excluded).count();
    let remarked_excluded_count = records[..excluded_count]
        .iter()
        .filter(|r| !r.remark.is_empty())
        .count();

    Report {
        records,
        exclusions,
        summary: Summary {
            total,
            excluded_count,
            valid_count: total - excluded_count,
            remarked_excluded_count,
        },
    }
}
