/*
 * Copyright 2024 Oxide Computer Company
 */

/*!
 * Request descriptors for version 2017-07-21 of the "axt" API.
 *
 * The "instanceIdss" accessors keep the behaviour of the published SDK: the
 * setter writes "instanceIds.1", "instanceIds.2", and so on, while the plain
 * getter reads the literal "instanceIdss" key, which the setter never writes.
 * Use "instance_ids()" to read back the values the setter stored.
 */

use axt_request::rpc_request;

rpc_request! {
    /**
     * Create a scheduled task that runs a command on a set of instances
     * according to a cron table entry.
     */
    pub struct CreateTaskRequest {
        product: "axt",
        version: "2017-07-21",
        action: "CreateTask",
    }
    scalar {
        command_id / set_command_id: "commandId",
        cron_tab / set_cron_tab: "cronTab",
    }
    array {
        instance_idss / set_instance_idss / instance_ids:
            "instanceIdss" => "instanceIds",
    }
}

rpc_request! {
    /**
     * Create a management task, which runs an instance management command on
     * a set of instances on a cron schedule.
     */
    pub struct CreateManageTaskRequest {
        product: "axt",
        version: "2017-07-21",
        action: "CreateManageTask",
    }
    scalar {
        cron / set_cron: "cron",
        inst_mg_cmd_id / set_inst_mg_cmd_id: "instMgCmdId",
    }
    array {
        instance_idss / set_instance_idss / instance_ids:
            "instanceIdss" => "instanceIds",
    }
}
