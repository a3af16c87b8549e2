//! HTTP request handlers

use axum::{
    extract::State,
    response::Html,
    Json,
};
use ndarray::Array2;
use polars::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::schema::{FeatureRecord, FEATURE_COLUMNS, PREVIEW_ROWS};

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// System
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "rows": state.dataset.n_rows(),
        "classes": state.encoder.classes(),
        "encoded_provenance": state.dataset.provenance(),
    }))
}

// ============================================================================
// Preview & Visualization
// ============================================================================

/// First rows of the dataset, verbatim
pub async fn get_data_preview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let preview = state.dataset.head(PREVIEW_ROWS);

    // Convert to JSON-serializable format
    let columns: Vec<serde_json::Value> = preview
        .get_columns()
        .iter()
        .map(|col| {
            let values: Vec<serde_json::Value> = (0..col.len())
                .map(|i| match col.get(i) {
                    Ok(AnyValue::Float64(v)) => serde_json::json!(v),
                    Ok(AnyValue::Float32(v)) => serde_json::json!(v),
                    Ok(AnyValue::Int64(v)) => serde_json::json!(v),
                    Ok(AnyValue::Int32(v)) => serde_json::json!(v),
                    Ok(AnyValue::String(v)) => serde_json::json!(v),
                    Ok(AnyValue::Boolean(v)) => serde_json::json!(v),
                    Ok(AnyValue::Null) => serde_json::Value::Null,
                    _ => serde_json::json!(col.get(i).map(|v| format!("{:?}", v)).unwrap_or_default()),
                })
                .collect();

            serde_json::json!({
                "name": col.name().to_string(),
                "values": values,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "rows": preview.height(),
        "columns": columns,
    })))
}

/// Record counts grouped by action, ordered by descending frequency
pub async fn get_action_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let counts = state.dataset.action_counts()?;

    let labels: Vec<&String> = counts.iter().map(|(label, _)| label).collect();
    let values: Vec<u64> = counts.iter().map(|(_, count)| *count).collect();

    Ok(Json(serde_json::json!({
        "labels": labels,
        "counts": values,
    })))
}

/// Bytes vs Packets over the full dataset, keyed by action
pub async fn get_scatter_points(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let points = state.dataset.scatter_points()?;
    Ok(Json(serde_json::json!({ "points": points })))
}

// ============================================================================
// Prediction
// ============================================================================

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<FeatureRecord>,
) -> Result<Json<serde_json::Value>> {
    let row = record.to_row();
    let x = Array2::from_shape_vec((1, FEATURE_COLUMNS.len()), row.to_vec())
        .map_err(|e| ServerError::BadRequest(format!("Invalid feature dimensions: {}", e)))?;

    let predictions = state.classifier.predict(&x)?;
    let code = predictions[0];
    let label = state.encoder.inverse_transform(code)?;

    debug!(code, label, "Prediction served");

    // Echo the submitted values in schema order for the summary table
    let inputs: Vec<serde_json::Value> = FEATURE_COLUMNS
        .iter()
        .zip(row.iter())
        .map(|(field, value)| serde_json::json!({ "field": field, "value": value }))
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "prediction": label,
        "prediction_display": label.to_uppercase(),
        "inputs": inputs,
    })))
}

// ============================================================================
// Evaluation
// ============================================================================

pub async fn get_evaluation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let eval = state.evaluation()?;
    Ok(Json(serde_json::json!(eval)))
}

// ============================================================================
// Web UI
// ============================================================================

pub async fn serve_index() -> Html<String> {
    // Embedded HTML for portability
    Html(EMBEDDED_INDEX_HTML.to_string())
}

const EMBEDDED_INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Network Traffic Action Predictor</title>
    <script defer src="https://cdn.jsdelivr.net/npm/alpinejs@3.x.x/dist/cdn.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>[x-cloak]{display:none!important}</style>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen" x-data="app()">
    <header class="bg-gray-800 border-b border-gray-700 px-6 py-4">
        <h1 class="text-xl font-bold">&#128272; Network Traffic Action Predictor</h1>
        <p class="text-sm text-gray-400">Predicts whether a network traffic record should be allowed or denied based on traffic features.</p>
    </header>
    <main class="p-6 space-y-6">
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">&#128196; Preview of Dataset</h2>
            <div class="overflow-x-auto">
                <table class="text-sm w-full" x-show="preview">
                    <thead><tr><template x-for="c in preview?.columns||[]"><th class="px-2 py-1 text-left text-gray-400" x-text="c.name"></th></template></tr></thead>
                    <tbody>
                        <template x-for="i in preview?.rows||0">
                            <tr class="border-t border-gray-700"><template x-for="c in preview.columns"><td class="px-2 py-1" x-text="c.values[i-1]"></td></template></tr>
                        </template>
                    </tbody>
                </table>
            </div>
        </section>
        <section class="grid grid-cols-2 gap-6">
            <div class="bg-gray-800 rounded-lg p-6">
                <h2 class="text-lg font-semibold mb-4">&#128202; Action Distribution</h2>
                <canvas id="distChart"></canvas>
            </div>
            <div class="bg-gray-800 rounded-lg p-6">
                <h2 class="text-lg font-semibold mb-4">Bytes vs Packets</h2>
                <canvas id="scatterChart"></canvas>
            </div>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">&#129534; Input Network Log for Prediction</h2>
            <form @submit.prevent="submitPrediction()">
                <div class="grid grid-cols-4 gap-4">
                    <template x-for="f in fields">
                        <div><label class="block text-sm mb-1" x-text="f.name"></label><input type="number" step="any" x-model.number="f.value" class="w-full bg-gray-700 rounded p-2"></div>
                    </template>
                </div>
                <button type="submit" class="mt-4 px-6 py-2 bg-blue-600 hover:bg-blue-700 rounded">&#128302; Predict</button>
            </form>
            <div x-show="result" x-cloak class="mt-6">
                <div class="bg-green-900 border border-green-600 rounded p-4 font-bold" x-text="'&#9989; Predicted Action: ' + result?.prediction_display"></div>
                <h3 class="text-md font-semibold mt-4 mb-2">&#128221; User Input Summary</h3>
                <table class="text-sm">
                    <template x-for="row in result?.inputs||[]">
                        <tr class="border-t border-gray-700"><td class="px-2 py-1 text-gray-400" x-text="row.field"></td><td class="px-2 py-1" x-text="row.value"></td></tr>
                    </template>
                </table>
            </div>
        </section>
        <section class="grid grid-cols-2 gap-6">
            <div class="bg-gray-800 rounded-lg p-6" x-show="evaluation" x-cloak>
                <h2 class="text-lg font-semibold mb-4">&#128201; Confusion Matrix</h2>
                <table class="text-sm mx-auto">
                    <tr><td></td><td></td><td class="text-center text-gray-400 px-2" :colspan="evaluation?.class_names.length">Predicted</td></tr>
                    <tr><td></td><td></td><template x-for="c in evaluation?.class_names||[]"><td class="px-3 py-1 text-center text-gray-400" x-text="c"></td></template></tr>
                    <template x-for="(row,i) in evaluation?.matrix||[]">
                        <tr>
                            <td class="text-gray-400 pr-2" x-show="i===0" :rowspan="evaluation.matrix.length">Actual</td>
                            <td class="px-3 py-1 text-gray-400 text-right" x-text="evaluation.class_names[i]"></td>
                            <template x-for="cell in row">
                                <td class="px-4 py-3 text-center font-mono" :style="'background-color: rgba(59,130,246,'+(matrixMax()?cell/matrixMax():0)+')'" x-text="cell"></td>
                            </template>
                        </tr>
                    </template>
                </table>
            </div>
            <div class="bg-gray-800 rounded-lg p-6" x-show="evaluation" x-cloak>
                <h2 class="text-lg font-semibold mb-4">Classification Report</h2>
                <pre class="text-sm font-mono whitespace-pre" x-text="evaluation?.report_text"></pre>
            </div>
        </section>
    </main>
    <script>
    function app(){return{
        preview:null,evaluation:null,result:null,
        fields:[
            {name:'Source Port',value:12345},{name:'Destination Port',value:443},
            {name:'NAT Source Port',value:56789},{name:'NAT Destination Port',value:443},
            {name:'Bytes',value:1000},{name:'Bytes Sent',value:500},{name:'Bytes Received',value:500},
            {name:'Packets',value:10},{name:'Elapsed Time (sec)',value:60},
            {name:'pkts_sent',value:5},{name:'pkts_received',value:5}
        ],
        async init(){
            this.preview=await (await fetch('/api/data/preview')).json();
            this.evaluation=await (await fetch('/api/evaluation')).json();
            this.drawDistribution(await (await fetch('/api/data/distribution')).json());
            this.drawScatter(await (await fetch('/api/data/scatter')).json());
        },
        matrixMax(){return Math.max(1,...(this.evaluation?.matrix||[[1]]).flat())},
        drawDistribution(d){
            new Chart(document.getElementById('distChart'),{type:'bar',
                data:{labels:d.labels,datasets:[{label:'Records',data:d.counts,backgroundColor:'rgb(59,130,246)'}]},
                options:{plugins:{legend:{display:false}}}});
        },
        drawScatter(d){
            const palette=['rgb(59,130,246)','rgb(239,68,68)','rgb(34,197,94)','rgb(234,179,8)'];
            const groups={};
            d.points.forEach(p=>{(groups[p.action]=groups[p.action]||[]).push({x:p.bytes,y:p.packets})});
            const datasets=Object.keys(groups).map((a,i)=>({label:a,data:groups[a],backgroundColor:palette[i%palette.length]}));
            new Chart(document.getElementById('scatterChart'),{type:'scatter',
                data:{datasets},
                options:{scales:{x:{title:{display:true,text:'Bytes'}},y:{title:{display:true,text:'Packets'}}}}});
        },
        async submitPrediction(){
            const body={};
            this.fields.forEach(f=>{body[f.name]=f.value});
            const r=await fetch('/api/predict',{method:'POST',headers:{'Content-Type':'application/json'},body:JSON.stringify(body)});
            this.result=await r.json();
        }
    }}
    </script>
</body>
</html>"##;
