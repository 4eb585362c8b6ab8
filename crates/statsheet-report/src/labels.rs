use statsheet_analyzer::model::{
    CorrelationMethod, CorrelationStrength, Direction, EffectMagnitude, ReliabilityBand,
};
use statsheet_analyzer::AnalysisKind;
use statsheet_core::Language;

/// Fixed captions for one report language.
#[derive(Debug)]
pub struct Labels {
    pub descriptive_title: &'static str,
    pub ttest_title: &'static str,
    pub anova_title: &'static str,
    pub correlation_title: &'static str,
    pub regression_title: &'static str,
    pub chi_square_title: &'static str,
    pub cronbach_title: &'static str,

    pub error: &'static str,
    pub significant: &'static str,
    pub not_significant: &'static str,
    pub significance_level: &'static str,
    pub sample_size: &'static str,
    pub rows: &'static str,
    pub effect_size: &'static str,

    pub numeric_variables: &'static str,
    pub categorical_variables: &'static str,
    pub group_statistics: &'static str,
    pub test_results: &'static str,
    pub anova_table: &'static str,
    pub post_hoc: &'static str,
    pub descriptives: &'static str,
    pub correlation_matrix: &'static str,
    pub significant_pairs: &'static str,
    pub no_significant_pairs: &'static str,
    pub stars_note: &'static str,
    pub model_summary: &'static str,
    pub coefficients: &'static str,
    pub equation: &'static str,
    pub contingency_table: &'static str,
    pub expected_counts: &'static str,
    pub low_expected_note: &'static str,
    pub yates_note: &'static str,
    pub reliability_statistics: &'static str,
    pub item_statistics: &'static str,

    pub variable: &'static str,
    pub group: &'static str,
    pub category: &'static str,
    pub item: &'static str,
    pub source: &'static str,
    pub between_groups: &'static str,
    pub within_groups: &'static str,
    pub regression: &'static str,
    pub residual: &'static str,
    pub total: &'static str,
    pub n: &'static str,
    pub mean: &'static str,
    pub median: &'static str,
    pub std_dev: &'static str,
    pub min: &'static str,
    pub max: &'static str,
    pub distinct: &'static str,
    pub count: &'static str,
    pub percent: &'static str,
    pub sum_of_squares: &'static str,
    pub df: &'static str,
    pub mean_square: &'static str,
    pub mean_difference: &'static str,
    pub std_error: &'static str,
    pub sig: &'static str,
    pub r_squared: &'static str,
    pub adj_r_squared: &'static str,
    pub std_error_estimate: &'static str,
    pub estimate: &'static str,
    pub strength: &'static str,
    pub direction: &'static str,
    pub item_total_correlation: &'static str,
    pub alpha_if_deleted: &'static str,
    pub n_items: &'static str,
    pub reliability: &'static str,

    pub negligible: &'static str,
    pub small: &'static str,
    pub medium: &'static str,
    pub large: &'static str,
    pub weak: &'static str,
    pub moderate: &'static str,
    pub strong: &'static str,
    pub very_strong: &'static str,
    pub positive: &'static str,
    pub negative: &'static str,
    pub pearson: &'static str,
    pub spearman: &'static str,
    pub unacceptable: &'static str,
    pub poor: &'static str,
    pub acceptable: &'static str,
    pub good: &'static str,
    pub very_good: &'static str,
    pub excellent: &'static str,
}

pub const ENGLISH: Labels = Labels {
    descriptive_title: "Descriptive Statistics",
    ttest_title: "Independent Samples T-Test",
    anova_title: "One-Way ANOVA",
    correlation_title: "Correlation Analysis",
    regression_title: "Linear Regression",
    chi_square_title: "Chi-Square Test of Independence",
    cronbach_title: "Reliability Analysis (Cronbach's Alpha)",

    error: "Error",
    significant: "The result is statistically significant",
    not_significant: "The result is not statistically significant",
    significance_level: "Significance level",
    sample_size: "Sample size",
    rows: "Rows",
    effect_size: "Effect size",

    numeric_variables: "Numeric Variables",
    categorical_variables: "Categorical Variables",
    group_statistics: "Group Statistics",
    test_results: "Test Results",
    anova_table: "ANOVA Table",
    post_hoc: "Post-hoc Comparisons (Bonferroni)",
    descriptives: "Descriptive Statistics",
    correlation_matrix: "Correlation Matrix",
    significant_pairs: "Significant Correlations",
    no_significant_pairs: "No pair of variables is significantly correlated.",
    stars_note: "* p < .05, ** p < .01, *** p < .001",
    model_summary: "Model Summary",
    coefficients: "Coefficients",
    equation: "Regression equation",
    contingency_table: "Contingency Table",
    expected_counts: "Expected Counts",
    low_expected_note: "Cells with expected count below 5",
    yates_note: "Yates continuity correction applied",
    reliability_statistics: "Reliability Statistics",
    item_statistics: "Item Statistics",

    variable: "Variable",
    group: "Group",
    category: "Category",
    item: "Item",
    source: "Source",
    between_groups: "Between Groups",
    within_groups: "Within Groups",
    regression: "Regression",
    residual: "Residual",
    total: "Total",
    n: "N",
    mean: "Mean",
    median: "Median",
    std_dev: "Std. Deviation",
    min: "Minimum",
    max: "Maximum",
    distinct: "Distinct",
    count: "Count",
    percent: "Percent",
    sum_of_squares: "Sum of Squares",
    df: "df",
    mean_square: "Mean Square",
    mean_difference: "Mean Difference",
    std_error: "Std. Error",
    sig: "Sig.",
    r_squared: "R Square",
    adj_r_squared: "Adjusted R Square",
    std_error_estimate: "Std. Error of the Estimate",
    estimate: "B",
    strength: "Strength",
    direction: "Direction",
    item_total_correlation: "Corrected Item-Total Correlation",
    alpha_if_deleted: "Alpha if Item Deleted",
    n_items: "N of Items",
    reliability: "Reliability",

    negligible: "negligible",
    small: "small",
    medium: "medium",
    large: "large",
    weak: "weak",
    moderate: "moderate",
    strong: "strong",
    very_strong: "very strong",
    positive: "positive",
    negative: "negative",
    pearson: "Pearson",
    spearman: "Spearman",
    unacceptable: "unacceptable",
    poor: "poor",
    acceptable: "acceptable",
    good: "good",
    very_good: "very good",
    excellent: "excellent",
};

pub const ARABIC: Labels = Labels {
    descriptive_title: "الإحصاءات الوصفية",
    ttest_title: "اختبار ت للعينات المستقلة",
    anova_title: "تحليل التباين الأحادي",
    correlation_title: "تحليل الارتباط",
    regression_title: "الانحدار الخطي",
    chi_square_title: "اختبار كاي تربيع للاستقلالية",
    cronbach_title: "تحليل الثبات (ألفا كرونباخ)",

    error: "خطأ",
    significant: "النتيجة دالة إحصائياً",
    not_significant: "النتيجة غير دالة إحصائياً",
    significance_level: "مستوى الدلالة",
    sample_size: "حجم العينة",
    rows: "عدد الصفوف",
    effect_size: "حجم الأثر",

    numeric_variables: "المتغيرات الكمية",
    categorical_variables: "المتغيرات الفئوية",
    group_statistics: "إحصاءات المجموعات",
    test_results: "نتائج الاختبار",
    anova_table: "جدول تحليل التباين",
    post_hoc: "المقارنات البعدية (Bonferroni)",
    descriptives: "الإحصاءات الوصفية",
    correlation_matrix: "مصفوفة الارتباط",
    significant_pairs: "الارتباطات الدالة",
    no_significant_pairs: "لا يوجد ارتباط دال إحصائياً بين أي متغيرين.",
    stars_note: "* p < .05، ** p < .01، *** p < .001",
    model_summary: "ملخص النموذج",
    coefficients: "المعاملات",
    equation: "معادلة الانحدار",
    contingency_table: "جدول التوافق",
    expected_counts: "التكرارات المتوقعة",
    low_expected_note: "عدد الخلايا ذات التكرار المتوقع أقل من 5",
    yates_note: "تم تطبيق تصحيح ييتس للاستمرارية",
    reliability_statistics: "إحصاءات الثبات",
    item_statistics: "إحصاءات الفقرات",

    variable: "المتغير",
    group: "المجموعة",
    category: "الفئة",
    item: "الفقرة",
    source: "مصدر التباين",
    between_groups: "بين المجموعات",
    within_groups: "داخل المجموعات",
    regression: "الانحدار",
    residual: "البواقي",
    total: "المجموع",
    n: "N",
    mean: "المتوسط",
    median: "الوسيط",
    std_dev: "الانحراف المعياري",
    min: "أدنى قيمة",
    max: "أعلى قيمة",
    distinct: "عدد القيم",
    count: "التكرار",
    percent: "النسبة المئوية",
    sum_of_squares: "مجموع المربعات",
    df: "df",
    mean_square: "متوسط المربعات",
    mean_difference: "فرق المتوسطات",
    std_error: "الخطأ المعياري",
    sig: "Sig.",
    r_squared: "R²",
    adj_r_squared: "R² المعدل",
    std_error_estimate: "الخطأ المعياري للتقدير",
    estimate: "B",
    strength: "القوة",
    direction: "الاتجاه",
    item_total_correlation: "ارتباط الفقرة بالدرجة الكلية",
    alpha_if_deleted: "ألفا عند حذف الفقرة",
    n_items: "عدد الفقرات",
    reliability: "مستوى الثبات",

    negligible: "ضئيل",
    small: "صغير",
    medium: "متوسط",
    large: "كبير",
    weak: "ضعيف",
    moderate: "متوسط",
    strong: "قوي",
    very_strong: "قوي جداً",
    positive: "طردي",
    negative: "عكسي",
    pearson: "بيرسون",
    spearman: "سبيرمان",
    unacceptable: "غير مقبول",
    poor: "ضعيف",
    acceptable: "مقبول",
    good: "جيد",
    very_good: "جيد جداً",
    excellent: "ممتاز",
};

impl Labels {
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::Ar => &ARABIC,
            Language::En => &ENGLISH,
        }
    }

    pub fn title(&self, kind: AnalysisKind) -> &'static str {
        match kind {
            AnalysisKind::Descriptive => self.descriptive_title,
            AnalysisKind::TTest => self.ttest_title,
            AnalysisKind::Anova => self.anova_title,
            AnalysisKind::Correlation => self.correlation_title,
            AnalysisKind::Regression => self.regression_title,
            AnalysisKind::ChiSquare => self.chi_square_title,
            AnalysisKind::Cronbach => self.cronbach_title,
        }
    }

    pub fn verdict(&self, significant: bool) -> &'static str {
        if significant {
            self.significant
        } else {
            self.not_significant
        }
    }

    pub fn effect(&self, magnitude: EffectMagnitude) -> &'static str {
        match magnitude {
            EffectMagnitude::Negligible => self.negligible,
            EffectMagnitude::Small => self.small,
            EffectMagnitude::Medium => self.medium,
            EffectMagnitude::Large => self.large,
        }
    }

    pub fn strength_of(&self, strength: CorrelationStrength) -> &'static str {
        match strength {
            CorrelationStrength::Weak => self.weak,
            CorrelationStrength::Moderate => self.moderate,
            CorrelationStrength::Strong => self.strong,
            CorrelationStrength::VeryStrong => self.very_strong,
        }
    }

    pub fn direction_of(&self, direction: Direction) -> &'static str {
        match direction {
            Direction::Positive => self.positive,
            Direction::Negative => self.negative,
        }
    }

    pub fn method(&self, method: CorrelationMethod) -> &'static str {
        match method {
            CorrelationMethod::Pearson => self.pearson,
            CorrelationMethod::Spearman => self.spearman,
        }
    }

    pub fn band(&self, band: ReliabilityBand) -> &'static str {
        match band {
            ReliabilityBand::Unacceptable => self.unacceptable,
            ReliabilityBand::Poor => self.poor,
            ReliabilityBand::Acceptable => self.acceptable,
            ReliabilityBand::Good => self.good,
            ReliabilityBand::VeryGood => self.very_good,
            ReliabilityBand::Excellent => self.excellent,
        }
    }
}
