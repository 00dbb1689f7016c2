mod common;

use orders_eda::io::read_orders_from_reader;
use orders_eda::stats::inference::Indicator;
use orders_eda::time_series::AutocorrelationVerdict;
use orders_eda::{
    compute_kpis, derive_features, run, AnalysisConfig, AutocorrelationOutcome, Column, Error,
    GroupDimension, MonthlyField, NormalityOutcome, OrderTable,
};

fn load(csv: &str) -> Result<OrderTable, Error> {
    read_orders_from_reader(csv.as_bytes())
}

// Test the documented feature derivation scenario end to end from CSV text
#[test]
fn test_feature_derivation_scenario() -> Result<(), Error> {
    let csv = "\
order_date,delivery_forecast,delivery_date,subtotal,discount,total,freight_price,product_price
2024-01-01,2024-01-05,2024-01-07,120,20,100,10,100
";
    let derived = derive_features(&load(csv)?);
    let record = &derived.records()[0];

    assert_eq!(record.delivery_delay_days, Some(2));
    assert_eq!(record.delivery_lead_time, Some(6));
    assert_eq!(record.is_late, Some(1));
    assert!((record.freight_share.unwrap() - 0.1).abs() < 1e-12);
    assert!((record.discount_abs.unwrap() - 20.0).abs() < 1e-12);

    // No confirmation column in the source, so none is invented
    assert!(!derived.has_column(Column::IsConfirmed));
    assert_eq!(derive_features(&derived), derived);
    Ok(())
}

// Test KPI rates for one category with 5 orders, 1 unconfirmed and 2 late
#[test]
fn test_kpi_scenario() -> Result<(), Error> {
    let csv = "\
order_id,order_date,delivery_forecast,delivery_date,product_price,is_confirmed,category
1,2024-01-01,2024-01-05,2024-01-04,10,1,books
2,2024-01-01,2024-01-05,2024-01-08,10,0,books
3,2024-01-01,2024-01-05,2024-01-09,10,1,books
4,2024-01-01,2024-01-05,2024-01-05,10,1,books
5,2024-01-01,2024-01-05,2024-01-03,10,1,books
";
    let derived = derive_features(&load(csv)?);
    let outcome = compute_kpis(&derived, GroupDimension::Category);
    let rows = outcome.rows().expect("category column is present");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].orders, 5);
    assert_eq!(rows[0].pct_canceled, Some(20.0));
    assert_eq!(rows[0].pct_late, Some(40.0));
    Ok(())
}

// Test monthly aggregation of three March orders
#[test]
fn test_monthly_scenario() -> Result<(), Error> {
    let csv = "\
order_date,product_price,freight_price
2024-03-01,10,1
2024-03-10,20,1
2024-03-31 23:59:59,30,1
,1000,1
";
    let report = run(&load(csv)?, &AnalysisConfig::default())?;

    assert_eq!(report.monthly.len(), 1);
    let march = &report.monthly.rows()[0];
    assert_eq!(march.month.to_string(), "2024-03");
    assert_eq!(march.revenue, 60.0);
    assert_eq!(march.orders, 3);
    Ok(())
}

// Test the full pipeline on fourteen months of orders
#[test]
fn test_full_pipeline() -> Result<(), Error> {
    let table = load(&common::sample_orders_csv(14))?;
    assert_eq!(table.len(), 112);

    let report = run(&table, &AnalysisConfig::default())?;

    // Monthly summary
    assert_eq!(report.monthly.len(), 14);
    let orders: f64 = report.monthly.series(MonthlyField::Orders).iter().sum();
    assert_eq!(orders, 112.0);
    assert!(report.monthly_correlation.is_some());

    // Autocorrelation uses the pipeline lag bound of 12
    assert_eq!(report.autocorrelation.len(), 3);
    for outcome in &report.autocorrelation {
        let result = outcome.result().expect("monthly series are long enough");
        assert_eq!(result.lags, 12);
        assert_eq!(result.ljung_box.len(), 12);
        assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
        let expected = AutocorrelationVerdict::from_p_value(result.p_value, 0.05);
        assert_eq!(result.verdict, expected);
    }

    // Confidence intervals are all defined
    assert_eq!(report.confidence_intervals.len(), 4);
    for ci in &report.confidence_intervals {
        let interval = ci.interval().expect("all indicator columns exist");
        assert!(interval.is_defined(), "{:?}", ci.indicator);
        assert!(interval.lower <= interval.estimate && interval.estimate <= interval.upper);
    }
    let lateness = report
        .confidence_intervals
        .iter()
        .find(|ci| ci.indicator == Indicator::LatenessRate)
        .and_then(|ci| ci.interval())
        .expect("lateness interval");
    assert!(lateness.lower.unwrap() >= 0.0 && lateness.upper.unwrap() <= 100.0);

    // Normality on both indicator columns
    assert_eq!(report.normality.len(), 2);
    for check in &report.normality {
        match &check.outcome {
            NormalityOutcome::Tested(r) => {
                assert!(r.statistic > 0.0 && r.statistic <= 1.0);
                assert_eq!(r.sample_size, 112);
                assert!(!r.subsampled);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    // KPI tables for every dimension, sorted by revenue
    assert_eq!(report.kpis.len(), 3);
    for kpi in &report.kpis {
        let rows = kpi.rows().expect("all dimensions present");
        assert_eq!(rows.iter().map(|r| r.orders).sum::<usize>(), 112);
        assert!(rows.windows(2).all(|w| w[0].total_revenue >= w[1].total_revenue));
    }

    // Inspection and feature correlation
    assert_eq!(report.inspection.rows, 112);
    let correlation = report.feature_correlation.as_ref().expect("features present");
    assert_eq!(correlation.labels.len(), 11);
    let r = correlation.get("total", "product_price").unwrap();
    assert!((r - 1.0).abs() < 1e-9);

    Ok(())
}

// Test that the pipeline is deterministic apart from its timestamp
#[test]
fn test_pipeline_is_deterministic() -> Result<(), Error> {
    let table = load(&common::sample_orders_csv(6))?;
    let config = AnalysisConfig::default();

    let first = run(&table, &config)?;
    let second = run(&table, &config)?;

    assert_eq!(first.monthly, second.monthly);
    assert_eq!(first.normality, second.normality);
    assert_eq!(first.autocorrelation, second.autocorrelation);
    assert_eq!(first.kpis, second.kpis);
    Ok(())
}

// Test that missing optional columns degrade to outcomes instead of errors
#[test]
fn test_missing_columns_are_reported() -> Result<(), Error> {
    let csv = "\
order_date,product_price
2024-01-01,10
2024-02-01,12
2024-03-01,9
";
    let report = run(&load(csv)?, &AnalysisConfig::default())?;

    assert!(report.kpis.iter().all(|k| k.rows().is_none()));
    let cancellation = report
        .confidence_intervals
        .iter()
        .find(|ci| ci.indicator == Indicator::CancellationRate)
        .expect("cancellation indicator");
    assert!(cancellation.interval().is_none());

    // Three months of revenue: two lags available
    let revenue = report.autocorrelation[0].result().expect("revenue series");
    assert_eq!(revenue.lags, 2);

    // Orders per month are constant
    assert!(matches!(
        report.autocorrelation[1],
        AutocorrelationOutcome::ZeroVariance { .. }
    ));
    Ok(())
}
