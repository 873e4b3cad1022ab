//! Built-in sector-ETF baskets so a rotation graph can be requested by
//! sector shorthand instead of typing out every constituent.

/// (sector ETF, constituents) in display order.
pub const SECTORS: &[(&str, &[&str])] = &[
    (
        "XLB",
        &[
            "AMCR", "MOS", "FCX", "SW", "IP", "DOW", "NEM", "CTVA", "FMC", "BALL", "CF", "DD",
            "ALB", "LYB", "EMN", "IFF", "STLD", "CE", "PPG", "NUE", "PKG", "AVY", "VMC", "ECL",
            "APD", "SHW", "MLM",
        ],
    ),
    (
        "XLC",
        &[
            "ATVI", "CHTR", "CMCSA", "DIS", "EA", "FB", "GOOG", "GOOGL", "NFLX", "TMUS", "TTWO",
            "TWTR", "VZ",
        ],
    ),
    (
        "XLE",
        &[
            "CVX", "XOM", "COP", "EOG", "SLB", "PXD", "VLO", "PSX", "MPC", "OXY", "KMI", "WMB",
            "HAL", "DVN", "BKR", "HES", "FANG", "APA", "MRO", "CTRA",
        ],
    ),
    (
        "XLF",
        &[
            "JPM", "BAC", "WFC", "C", "GS", "MS", "BLK", "SCHW", "USB", "AXP", "PNC", "TFC",
            "COF", "BK", "SPGI", "CME", "CB", "MMC", "AON", "MET",
        ],
    ),
    (
        "XLI",
        &[
            "HON", "UNP", "UPS", "BA", "CAT", "GE", "MMM", "LMT", "RTX", "DE", "FDX", "EMR",
            "ETN", "NSC", "WM", "ITW", "CSX", "GD", "ROK", "LHX",
        ],
    ),
    (
        "XLK",
        &[
            "AAPL", "MSFT", "NVDA", "V", "MA", "AVGO", "CSCO", "ACN", "ADBE", "CRM", "INTC",
            "QCOM", "TXN", "ORCL", "IBM", "AMD", "PYPL", "INTU", "NOW", "ADI",
        ],
    ),
    (
        "XLP",
        &[
            "PG", "KO", "PEP", "WMT", "COST", "PM", "MO", "EL", "CL", "KMB", "KHC", "GIS", "SYY",
            "STZ", "KR", "HSY", "TSN", "CAG", "CHD", "K",
        ],
    ),
    (
        "XHB",
        &[
            "LEN", "DHI", "PHM", "NVR", "TOL", "KBH", "TPH", "MDC", "MHO", "LGIH", "TMHC", "CCS",
            "MTH", "BZH", "HOV", "GRBK", "SKY", "CVCO", "MHK", "LEG",
        ],
    ),
    (
        "XLU",
        &[
            "NEE", "DUK", "SO", "D", "AEP", "SRE", "EXC", "XEL", "WEC", "ES", "ED", "PEG", "AWK",
            "EIX", "DTE", "FE", "AEE", "CMS", "ETR", "AES",
        ],
    ),
    (
        "XLV",
        &[
            "UNH", "JNJ", "PFE", "ABT", "MRK", "TMO", "ABBV", "DHR", "BMY", "LLY", "AMGN", "MDT",
            "ISRG", "CVS", "GILD", "SYK", "VRTX", "ZTS", "BDX", "BSX",
        ],
    ),
    (
        "XLY",
        &[
            "AMZN", "TSLA", "HD", "MCD", "NKE", "LOW", "SBUX", "TJX", "TGT", "BKNG", "F", "GM",
            "MAR", "ROST", "HLT", "YUM", "DG", "DPZ", "ORLY", "CMG",
        ],
    ),
    (
        "XLRE",
        &[
            "PLD", "AMT", "CCI", "EQIX", "PSA", "O", "WELL", "SPG", "SBAC", "DLR", "VICI", "AVB",
            "EQR", "WY", "ARE", "VTR", "EXR", "MAA", "UDR", "BXP",
        ],
    ),
];

/// Looks up the constituents of a sector ETF, case-insensitively.
pub fn sector_symbols(etf: &str) -> Option<Vec<String>> {
    let wanted = etf.to_ascii_uppercase();
    SECTORS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, members)| members.iter().map(|s| s.to_string()).collect())
}
