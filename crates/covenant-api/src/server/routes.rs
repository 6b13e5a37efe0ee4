#[derive(Debug, Deserialize)]
struct CreateContractRequest {
    preset_id: String,
    owner: String,
}

#[derive(Debug, Serialize)]
struct ListContractsResponse {
    schema_version: String,
    contracts: Vec<ContractSnapshot>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum AdvanceOp {
    Activate,
    Finalize,
    Breach,
    Cancel,
}

#[derive(Debug, Deserialize)]
struct AdvanceRequest {
    op: AdvanceOp,
}

#[derive(Debug, Serialize)]
struct AdvanceResponse {
    schema_version: String,
    handle: ContractHandle,
    op: AdvanceOp,
    applied: bool,
    status: ContractStatus,
}

#[derive(Debug, Serialize)]
struct ChangesResponse {
    schema_version: String,
    changes: Vec<StatusChange>,
}

#[derive(Debug, Serialize)]
struct PresetsResponse {
    schema_version: String,
    presets: Vec<String>,
}

async fn create_contract(
    State(state): State<AppState>,
    Json(request): Json<CreateContractRequest>,
) -> Result<Json<ContractSnapshot>, HttpApiError> {
    let mut console = state.console.lock().await;
    let handle = console
        .create(&request.preset_id, &request.owner)
        .map_err(HttpApiError::from_console)?;
    let snapshot = console.snapshot(handle).ok_or_else(|| {
        HttpApiError::internal("created contract has no snapshot", Some(format!("handle={handle}")))
    })?;
    Ok(Json(snapshot))
}

async fn list_contracts(
    State(state): State<AppState>,
) -> Result<Json<ListContractsResponse>, HttpApiError> {
    let console = state.console.lock().await;
    Ok(Json(ListContractsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        contracts: console.snapshots(),
    }))
}

async fn get_contract(
    Path(handle): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ContractSnapshot>, HttpApiError> {
    let handle = ContractHandle(handle);
    let console = state.console.lock().await;
    console
        .snapshot(handle)
        .map(Json)
        .ok_or_else(|| HttpApiError::contract_not_found(handle))
}

async fn advance_contract(
    Path(handle): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, HttpApiError> {
    let handle = ContractHandle(handle);
    let mut console = state.console.lock().await;
    let manager = console.manager_mut();

    // A rejected transition is routine ("someone already resolved this
    // contract"), reported as applied=false; only an unknown handle is an
    // error.
    let applied = match request.op {
        AdvanceOp::Activate => manager.activate(handle),
        AdvanceOp::Finalize => manager.finalize(handle),
        AdvanceOp::Breach => manager.breach(handle),
        AdvanceOp::Cancel => manager.cancel(handle),
    }
    .map_err(|_| HttpApiError::contract_not_found(handle))?;

    let status = manager
        .record(handle)
        .map(|record| record.status)
        .ok_or_else(|| HttpApiError::contract_not_found(handle))?;

    Ok(Json(AdvanceResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        handle,
        op: request.op,
        applied,
        status,
    }))
}

async fn get_changes(State(state): State<AppState>) -> Json<ChangesResponse> {
    let console = state.console.lock().await;
    Json(ChangesResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        changes: console.manager().changes().to_vec(),
    })
}

async fn get_presets(State(state): State<AppState>) -> Json<PresetsResponse> {
    let console = state.console.lock().await;
    Json(PresetsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        presets: console.complete(0, ""),
    })
}
