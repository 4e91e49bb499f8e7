//! Fixed keyword taxonomy for procurement document classification.
//!
//! Two independent vocabularies live here: the coarse category keywords
//! used by the section classifier, and the ordered list of specific
//! criteria each with its own search terms. Both are process-wide
//! constants; all phrases are lowercase ASCII.

use tenderlens_shared::Category;

/// Phrases that file a text section under a category.
///
/// A single phrase match is enough for membership; categories are tested
/// independently, so a section can carry several of them.
pub static CATEGORY_KEYWORDS: [(Category, &[&str]); 4] = [
    (
        Category::Technical,
        &[
            "technical qualification",
            "technical criteria",
            "technical requirement",
            "similar work",
            "work experience",
            "project experience",
            "completion certificate",
            "work order",
            "technical capacity",
            "technical capability",
            "eligible works",
            "qualification requirement",
            "technical eligibility",
        ],
    ),
    (
        Category::Financial,
        &[
            "turnover",
            "financial qualification",
            "financial criteria",
            "financial requirement",
            "annual turnover",
            "average annual turnover",
            "financial capacity",
            "financial capability",
            "net worth",
            "liquid asset",
            "solvency",
            "working capital",
            "financial statement",
            "balance sheet",
            "profit and loss",
            "financial position",
            "financial standing",
            "financial strength",
            "revenue",
        ],
    ),
    (
        Category::JointVenture,
        &[
            "joint venture",
            "jv ",
            "consortium",
            "jv criteria",
            "jv requirement",
            "lead member",
            "lead partner",
            "jv agreement",
            "jv formation",
        ],
    ),
    (
        Category::CommercialClauses,
        &[
            "earnest money",
            "emd",
            "bid security",
            "performance security",
            "security deposit",
            "retention money",
            "defect liability",
            "completion period",
        ],
    ),
];

/// One specific procurement criterion and the terms that locate it.
#[derive(Debug, Clone, Copy)]
pub struct CriteriaSpec {
    /// Stable key used in results (e.g. `emd_submission`).
    pub key: &'static str,
    /// Search terms, most common first. The ordering is a scan
    /// optimization only and carries no ranking meaning.
    pub terms: &'static [&'static str],
}

/// The fixed, ordered list of specific criteria to extract.
pub static CRITERIA_SPECS: [CriteriaSpec; 11] = [
    CriteriaSpec {
        key: "turnover",
        terms: &[
            "turnover",
            "annual turnover",
            "average annual turnover",
            "financial turnover",
            "revenue",
        ],
    },
    CriteriaSpec {
        key: "emd_submission",
        terms: &[
            "earnest money deposit",
            "emd",
            "bid security",
            "mode of emd",
            "emd submission",
        ],
    },
    CriteriaSpec {
        key: "completion_period",
        terms: &[
            "completion period",
            "contract period",
            "time of completion",
            "project timeline",
        ],
    },
    CriteriaSpec {
        key: "performance_security",
        terms: &[
            "performance security",
            "performance guarantee",
            "performance bond",
        ],
    },
    CriteriaSpec {
        key: "security_deposit",
        terms: &[
            "security deposit",
            "retention money",
            "retention amount",
            "withheld amount",
        ],
    },
    CriteriaSpec {
        key: "defect_liability",
        terms: &[
            "defect liability",
            "defect liability period",
            "maintenance period",
            "warranty period",
        ],
    },
    CriteriaSpec {
        key: "mobilization_advance",
        terms: &[
            "mobilization advance",
            "mobilisation advance",
            "advance payment",
        ],
    },
    CriteriaSpec {
        key: "solvency_working_capital",
        terms: &["solvency", "working capital", "bank solvency", "credit facility"],
    },
    CriteriaSpec {
        key: "liquid_asset",
        terms: &["liquid asset", "cash flow", "liquidity", "liquid fund"],
    },
    CriteriaSpec {
        key: "price_variation",
        terms: &[
            "price variation",
            "price adjustment",
            "escalation clause",
            "price escalation",
        ],
    },
    CriteriaSpec {
        key: "incentive_bonus",
        terms: &[
            "incentive",
            "bonus clause",
            "early completion bonus",
            "performance bonus",
        ],
    },
];
